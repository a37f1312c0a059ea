//! Error types

mod api;
mod grid;
mod lookup;

pub use api::*;
pub use grid::*;
pub use lookup::*;
