use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use crate::listing::{ArticleListController, SnapshotDelta};
use crate::source::ContentSource;
use crate::TARGET_REFRESH;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Fetch one snapshot and load it into the live controller. On a fetch
/// failure the previous snapshot stays in place and `None` is returned.
pub async fn refresh_once(
    source: &dyn ContentSource,
    live: &Mutex<ArticleListController>,
) -> Option<SnapshotDelta> {
    let articles = match source.fetch().await {
        Ok(articles) => articles,
        Err(err) => {
            error!(target: TARGET_REFRESH, "Refresh from {} failed: {}", source.name(), err);
            return None;
        }
    };

    // Whichever refresh takes the lock last wins.
    let delta = live.lock().await.load_snapshot(articles);
    if delta.added > 0 {
        info!(target: TARGET_REFRESH, "{} new article(s) published!", delta.added);
    }
    Some(delta)
}

/// Reloads the live snapshot every `period`, forever.
pub async fn refresh_loop(
    source: Arc<dyn ContentSource>,
    live: Arc<Mutex<ArticleListController>>,
    period: Duration,
) {
    info!(target: TARGET_REFRESH, "Refreshing from {} every {:?}", source.name(), period);
    loop {
        sleep(period).await;
        refresh_once(source.as_ref(), &live).await;
    }
}

/// Delays an action and drops it if another one is submitted before the
/// delay runs out. Only the last submitted action runs.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn submit<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            action.await;
        }));
    }

    /// Drop the pending action, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
