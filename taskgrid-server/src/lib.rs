//! HTTP API serving the task grid and the user directory.
//!
//! Routes live under `/api`, answer with the JSON envelope from
//! [`taskgrid_lib::ApiResponse`], and are rate limited per client address.

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod search;
pub mod server;
pub mod services;
pub mod state;
pub mod validation;

pub use config::ServerConfig;
pub use error::AppError;
pub use error::ServerError;
pub use server::Server;
pub use state::AppState;
