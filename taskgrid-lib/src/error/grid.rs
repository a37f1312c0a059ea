//! Grid model errors

use crate::model::CellType;

/// Errors raised while building or mutating a [`GridData`](crate::model::GridData).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Two columns share an id.
    #[error("duplicate column id: {0}")]
    DuplicateColumn(String),

    /// Two rows share an id.
    #[error("duplicate row id: {0}")]
    DuplicateRow(String),

    /// The new value does not have the payload shape of the target cell.
    #[error("cannot store a {found} value in a {expected} cell")]
    ValueMismatch {
        /// Type of the target cell.
        expected: CellType,
        /// Shape of the rejected value.
        found: &'static str,
    },
}
