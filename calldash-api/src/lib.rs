pub mod config;
pub mod handlers;
pub mod helpers;
pub mod views;

pub use handlers::DashboardAppState;
pub use helpers::source_cache::SourceCache;
