//! Column definitions

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::CellType;

/// Column width as sent by the server: a CSS length or a bare number of pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnWidth {
    /// Pixels.
    Pixels(f64),
    /// Any CSS length, e.g. `"300px"` or `"20%"`.
    Css(String),
}

impl ColumnWidth {
    /// Returns the width in pixels when it is absolute.
    pub fn pixels(&self) -> Option<f64> {
        match self {
            ColumnWidth::Pixels(px) => Some(*px),
            ColumnWidth::Css(css) => css.trim().strip_suffix("px")?.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ColumnWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnWidth::Pixels(px) => write!(f, "{}px", px),
            ColumnWidth::Css(css) => f.write_str(css),
        }
    }
}

impl From<&str> for ColumnWidth {
    fn from(v: &str) -> Self {
        ColumnWidth::Css(v.to_string())
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Column definition. Immutable once the table is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Unique id within the table; rows key their cells by it.
    pub id: String,
    /// Header text.
    pub title: String,
    /// Declared cell type.
    #[serde(rename = "type")]
    pub cell_type: CellType,
    /// Default width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<ColumnWidth>,
    /// Whether cells in this column can be edited.
    #[serde(default, skip_serializing_if = "is_false")]
    pub editable: bool,
    /// Whether the header can be clicked to sort.
    #[serde(default, skip_serializing_if = "is_false")]
    pub sortable: bool,
    /// Whether the width can be overridden by the user.
    #[serde(default, skip_serializing_if = "is_false")]
    pub resizable: bool,
}

impl Column {
    /// Creates a read-only, unsortable column.
    pub fn new(id: impl Into<String>, title: impl Into<String>, cell_type: CellType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            cell_type,
            width: None,
            editable: false,
            sortable: false,
            resizable: false,
        }
    }

    /// Sets the default width.
    pub fn width(mut self, width: impl Into<ColumnWidth>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Marks the column editable.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Marks the column sortable.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Marks the column resizable.
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }
}
