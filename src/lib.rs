pub mod article;
pub mod db;
pub mod environment;
pub mod listing;
pub mod logging;
pub mod reading;
pub mod refresh;
pub mod source;
pub mod web;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_DB: &str = "db_query";
pub const TARGET_LISTING: &str = "listing";
pub const TARGET_REFRESH: &str = "refresh";
