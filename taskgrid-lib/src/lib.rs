//! Task grid library
//!
//! A headless data grid with typed cells. A per-grid [`PluginRegistry`] maps
//! each [`CellType`](model::CellType) to a renderer and an editor; [`DataGrid`]
//! owns the table and the selection/edit state machine. Also holds the JSON
//! envelope and the HTTP client for the task API.

pub mod debounce;
pub mod directory;
pub mod edit;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod model;
pub mod registry;
pub mod render;
pub mod response;
pub mod sort;

mod client;

pub use client::*;
pub use directory::UserDirectory;
pub use fetch::FetchState;
pub use grid::DataGrid;
pub use registry::PluginRegistry;
pub use response::ApiResponse;
