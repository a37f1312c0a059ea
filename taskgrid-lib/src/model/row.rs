//! Rows

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use super::Cell;

/// A row: an id plus cells keyed by column id.
///
/// A row may lack a cell for some column; consumers must handle absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Unique row id.
    pub id: String,
    /// Cells keyed by column id, in wire order.
    #[serde(default)]
    pub cells: IndexMap<String, Cell>,
}

impl Row {
    /// Creates an empty row.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: IndexMap::new(),
        }
    }

    /// Adds a cell for a column.
    pub fn with_cell(mut self, column_id: impl Into<String>, cell: Cell) -> Self {
        self.cells.insert(column_id.into(), cell);
        self
    }

    /// Returns the cell for a column, if present.
    pub fn cell(&self, column_id: &str) -> Option<&Cell> {
        self.cells.get(column_id)
    }
}
