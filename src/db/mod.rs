// Re-export the Database struct and other public items
mod article;
mod category;
pub mod core;
mod schema;
mod site;

// Re-export Database and essential traits
pub use self::article::ArticleDraft;
pub use self::core::Database;
pub use self::core::DbLockErrorExt;
pub use self::site::{ContactMessage, DashboardStats, SiteSettings};
pub use sqlx::Row;
