//! Typed cells

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::CellValue;
use super::User;
use crate::error::GridError;

/// Discriminant of a cell payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// Free text.
    Text,
    /// Numeric value.
    Number,
    /// Date, kept as the string the server sent.
    Date,
    /// Status-like tag.
    Tag,
    /// Hyperlink with a display label.
    Link,
    /// A single user.
    User,
    /// A list of users.
    MultiUser,
}

impl CellType {
    /// All cell types, in declaration order.
    pub const ALL: [CellType; 7] = [
        CellType::Text,
        CellType::Number,
        CellType::Date,
        CellType::Tag,
        CellType::Link,
        CellType::User,
        CellType::MultiUser,
    ];

    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            CellType::Text => "text",
            CellType::Number => "number",
            CellType::Date => "date",
            CellType::Tag => "tag",
            CellType::Link => "link",
            CellType::User => "user",
            CellType::MultiUser => "multi_user",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a cell, one variant per [`CellType`].
///
/// Serialized internally tagged, e.g. `{"type":"link","value":"Docs","href":"https://…"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellContent {
    /// Free text.
    Text { value: String },
    /// Numeric value.
    Number { value: f64 },
    /// Date string.
    Date { value: String },
    /// Tag label.
    Tag { value: String },
    /// Link label and target.
    Link { value: String, href: String },
    /// Single user.
    User { value: User },
    /// List of users.
    MultiUser { value: Vec<User> },
}

/// A single grid cell: a typed payload plus an optional editability override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Typed payload.
    #[serde(flatten)]
    pub content: CellContent,
    /// Per-cell override; `Some(false)` blocks editing even in an editable column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
}

impl Cell {
    fn from_content(content: CellContent) -> Self {
        Self {
            content,
            editable: None,
        }
    }

    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::from_content(CellContent::Text {
            value: value.into(),
        })
    }

    /// Creates a number cell.
    pub fn number(value: f64) -> Self {
        Self::from_content(CellContent::Number { value })
    }

    /// Creates a date cell.
    pub fn date(value: impl Into<String>) -> Self {
        Self::from_content(CellContent::Date {
            value: value.into(),
        })
    }

    /// Creates a tag cell.
    pub fn tag(value: impl Into<String>) -> Self {
        Self::from_content(CellContent::Tag {
            value: value.into(),
        })
    }

    /// Creates a link cell.
    pub fn link(value: impl Into<String>, href: impl Into<String>) -> Self {
        Self::from_content(CellContent::Link {
            value: value.into(),
            href: href.into(),
        })
    }

    /// Creates a single-user cell.
    pub fn user(value: User) -> Self {
        Self::from_content(CellContent::User { value })
    }

    /// Creates a multi-user cell.
    pub fn multi_user(value: Vec<User>) -> Self {
        Self::from_content(CellContent::MultiUser { value })
    }

    /// Sets the editability override.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    /// Returns the type tag of this cell.
    pub fn cell_type(&self) -> CellType {
        match &self.content {
            CellContent::Text { .. } => CellType::Text,
            CellContent::Number { .. } => CellType::Number,
            CellContent::Date { .. } => CellType::Date,
            CellContent::Tag { .. } => CellType::Tag,
            CellContent::Link { .. } => CellType::Link,
            CellContent::User { .. } => CellType::User,
            CellContent::MultiUser { .. } => CellType::MultiUser,
        }
    }

    /// Returns `false` only when the cell is explicitly marked non-editable.
    pub fn is_editable(&self) -> bool {
        self.editable != Some(false)
    }

    /// Returns a copy of the payload.
    pub fn value(&self) -> CellValue {
        match &self.content {
            CellContent::Text { value }
            | CellContent::Date { value }
            | CellContent::Tag { value }
            | CellContent::Link { value, .. } => CellValue::Text(value.clone()),
            CellContent::Number { value } => CellValue::Number(*value),
            CellContent::User { value } => CellValue::User(value.clone()),
            CellContent::MultiUser { value } => CellValue::Users(value.clone()),
        }
    }

    /// Checks that `value` has the payload shape this cell stores.
    pub fn accepts(&self, value: &CellValue) -> Result<(), GridError> {
        let fits = matches!(
            (&self.content, value),
            (
                CellContent::Text { .. }
                    | CellContent::Date { .. }
                    | CellContent::Tag { .. }
                    | CellContent::Link { .. },
                CellValue::Text(_)
            ) | (CellContent::Number { .. }, CellValue::Number(_))
                | (CellContent::User { .. }, CellValue::User(_))
                | (CellContent::MultiUser { .. }, CellValue::Users(_))
        );
        if fits {
            Ok(())
        } else {
            Err(GridError::ValueMismatch {
                expected: self.cell_type(),
                found: value.shape_name(),
            })
        }
    }

    /// Replaces the payload, keeping the type tag, the link target and the
    /// editability override.
    pub fn set_value(&mut self, value: CellValue) -> Result<(), GridError> {
        self.accepts(&value)?;
        match (&mut self.content, value) {
            (
                CellContent::Text { value: slot }
                | CellContent::Date { value: slot }
                | CellContent::Tag { value: slot }
                | CellContent::Link { value: slot, .. },
                CellValue::Text(v),
            ) => *slot = v,
            (CellContent::Number { value: slot }, CellValue::Number(v)) => *slot = v,
            (CellContent::User { value: slot }, CellValue::User(v)) => *slot = v,
            (CellContent::MultiUser { value: slot }, CellValue::Users(v)) => *slot = v,
            _ => {}
        }
        Ok(())
    }

    /// Returns the string payload of a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            CellContent::Text { value } => Some(value),
            _ => None,
        }
    }

    /// Returns the user list of a multi-user cell.
    pub fn as_users(&self) -> Option<&[User]> {
        match &self.content {
            CellContent::MultiUser { value } => Some(value),
            _ => None,
        }
    }
}
