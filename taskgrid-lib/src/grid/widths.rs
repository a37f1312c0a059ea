//! User column width overrides

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::model::ColumnWidth;

/// Width overrides keyed by column id.
///
/// Serializes as a plain JSON object so hosts can persist it between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnWidths {
    widths: BTreeMap<String, ColumnWidth>,
}

impl ColumnWidths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column_id: &str) -> Option<&ColumnWidth> {
        self.widths.get(column_id)
    }

    pub fn set(&mut self, column_id: impl Into<String>, width: impl Into<ColumnWidth>) {
        self.widths.insert(column_id.into(), width.into());
    }

    pub fn remove(&mut self, column_id: &str) -> Option<ColumnWidth> {
        self.widths.remove(column_id)
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}
