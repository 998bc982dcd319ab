//! FraudGuard command-line tool and HTTP service
//!
//! The `fraudguard` binary screens single transactions (`check`), CSV files
//! (`batch`), and serves both over HTTP (`serve`).

pub mod cli;
pub mod config;
pub mod report;
pub mod routes;
pub mod state;

pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use routes::create_router;
pub use state::AppState;
