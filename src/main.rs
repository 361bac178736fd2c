use anyhow::Result;
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row as PrettyRow, Table};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::info;

use newsroom::db::Database;
use newsroom::environment::{log_dir_from_env, Settings};
use newsroom::listing::{ArticleListController, ListView, ListingConfig, SortMode, StatusScope};
use newsroom::logging::configure_logging;
use newsroom::reading::{capitalize_first, excerpt_preview, format_date};
use newsroom::refresh::{refresh_loop, refresh_once};
use newsroom::source::{seed_fallback, ContentSource, DatabaseSource, FallbackSource};
use newsroom::web::{self, AppState};

const EXCERPT_PREVIEW_CHARS: usize = 80;

#[derive(Parser)]
#[clap(name = "newsroom", about = "Article listing service for the newsroom site")]
struct Cli {
    /// SQLite database file (overrides DATABASE_PATH)
    #[clap(long, global = true)]
    database: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON API and keep the live snapshot refreshed
    Serve {
        /// Port to listen on (overrides PORT)
        #[clap(short, long)]
        port: Option<u16>,
    },

    /// Print one page of the article listing
    List {
        /// Case-insensitive text filter
        #[clap(short, long, default_value = "")]
        search: String,

        /// Category slug, or "all"
        #[clap(short, long, default_value = "all")]
        category: String,

        /// newest, oldest or title
        #[clap(long, default_value = "newest")]
        sort: String,

        #[clap(short, long, default_value = "1")]
        page: usize,

        /// Include drafts, using the admin page size
        #[clap(short, long)]
        drafts: bool,
    },

    /// Fill an empty database with the built-in articles and categories
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Logging goes first so warnings about bad settings are recorded
    let _log_guard = configure_logging(&log_dir_from_env());

    let mut settings = Settings::from_env();
    if let Some(database) = args.database {
        settings.database_path = database;
    }

    let db = Database::new(&settings.database_path).await?;

    match args.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.port = port;
            }
            serve(db, settings).await?;
        }
        Commands::List {
            search,
            category,
            sort,
            page,
            drafts,
        } => {
            list(&db, &settings, &search, &category, &sort, page, drafts).await?;
        }
        Commands::Seed => {
            let written = seed_fallback(&db).await?;
            if written == 0 {
                println!("Database already has articles, nothing seeded.");
            } else {
                println!("Seeded {} article(s).", written);
            }
        }
    }

    Ok(())
}

async fn serve(db: Database, settings: Settings) -> Result<()> {
    let port = settings.port;
    let interval = Duration::from_secs(settings.refresh_interval_secs);
    let state = AppState::new(db.clone(), settings);

    let source: Arc<dyn ContentSource> = Arc::new(FallbackSource::new(DatabaseSource::new(
        db,
        StatusScope::PublishedOnly,
    )));
    refresh_once(source.as_ref(), &state.live).await;
    info!("Loaded {} article(s)", state.live.lock().await.snapshot().len());

    tokio::spawn(refresh_loop(source, Arc::clone(&state.live), interval));

    web::serve(state, port).await
}

async fn list(
    db: &Database,
    settings: &Settings,
    search: &str,
    category: &str,
    sort: &str,
    page: usize,
    drafts: bool,
) -> Result<()> {
    let (config, scope) = if drafts {
        (ListingConfig::admin(settings.admin_page_size), StatusScope::All)
    } else {
        (ListingConfig::public(settings.page_size), StatusScope::PublishedOnly)
    };
    let articles = DatabaseSource::new(db.clone(), scope).fetch().await?;

    let mut controller = ArticleListController::new(config);
    controller.load_snapshot(articles);
    controller.set_search_query(search);
    controller.set_category_filter(category);
    controller.set_sort_mode(SortMode::from(sort));
    if !controller.go_to_page(page) {
        println!(
            "Page {} does not exist, showing page {}.",
            page,
            controller.parameters().current_page
        );
    }

    // Subscribing renders the current page once
    controller.subscribe(print_view);
    Ok(())
}

fn print_view(view: &ListView) {
    let mut table = Table::new();
    table.add_row(PrettyRow::new(vec![
        Cell::new("ID"),
        Cell::new("Date"),
        Cell::new("Title"),
        Cell::new("Category"),
        Cell::new("Status"),
        Cell::new("Excerpt"),
    ]));

    for article in &view.items {
        table.add_row(PrettyRow::new(vec![
            Cell::new(&article.id.to_string()),
            Cell::new(&format_date(&article.published_at)),
            Cell::new(&article.title),
            Cell::new(&article.category_label),
            Cell::new(&capitalize_first(article.status.as_str())),
            Cell::new(&excerpt_preview(&article.excerpt, EXCERPT_PREVIEW_CHARS)),
        ]));
    }

    table.printstd();
    println!("{}", view.range_label);
    if view.show_pagination {
        println!("{}", view.page_label);
    }
}
