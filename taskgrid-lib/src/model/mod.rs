//! Grid data model

mod cell;
mod column;
mod grid;
mod row;
mod user;
mod value;

pub use cell::*;
pub use column::*;
pub use grid::*;
pub use row::*;
pub use user::*;
pub use value::*;
