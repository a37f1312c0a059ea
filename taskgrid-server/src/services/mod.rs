//! Data services behind the handlers

pub mod mock;
mod tasks;
mod users;

pub use tasks::*;
pub use users::*;
