//! Cell renderers
//!
//! A renderer turns a cell into a [`CellView`], a host-agnostic description of
//! what to draw. Hosts (the terminal CLI, a web front end) map views onto
//! their own primitives.

mod link;
mod multi_user;
mod tag;
mod text;

pub use link::LinkRenderer;
pub use multi_user::*;
pub use tag::*;
pub use text::TextRenderer;

use std::cell::Cell as Flag;

use crate::model::Cell;
use crate::model::Column;
use crate::model::User;

/// Text shown in place of a cell whose type does not match its strategy.
pub const INVALID_CELL_TYPE: &str = "Invalid cell type";

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from `0xRRGGBB`.
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One avatar in a user cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Avatar {
    /// Id of the user shown.
    pub user_id: String,
    /// First letter of the name, drawn when there is no image.
    pub initial: Option<char>,
    /// Image URL, if the user has one.
    pub image: Option<String>,
    /// Background color; only set when there is no image.
    pub color: Option<Rgb>,
    /// Hover text: name and, if known, email.
    pub tooltip: String,
}

/// State of the multi-user picker, as drawn by the editor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserPickerView {
    /// Users in the draft.
    pub selected: Vec<User>,
    /// Current search input.
    pub query: String,
    /// Options from the last applied lookup.
    pub options: Vec<User>,
    /// A lookup is in flight.
    pub loading: bool,
    /// Inline lookup error.
    pub error: Option<String>,
}

/// What a cell looks like, independent of any UI toolkit.
#[derive(Debug, Clone, PartialEq)]
pub enum CellView {
    /// Plain text.
    Text(String),
    /// Colored tag chip.
    Tag { label: String, style: TagStyle },
    /// Hyperlink. Activating it does not select the cell.
    Link { label: String, href: String },
    /// Avatar cluster with an optional `+N` overflow and a caption.
    Avatars {
        avatars: Vec<Avatar>,
        /// Users not shown as avatars.
        overflow: usize,
        /// Name shown next to the cluster.
        caption: String,
        /// Count shown in the chip after the caption, when more than one user.
        extra: Option<usize>,
    },
    /// Muted placeholder text, e.g. `None` for an empty user list.
    Placeholder(String),
    /// The cell does not match the strategy or column type.
    Invalid,
    /// Text input holding an edit draft.
    Input { value: String },
    /// Multi-user picker.
    UserPicker(UserPickerView),
}

impl CellView {
    /// Returns `true` if activating the view's content is handled by the view
    /// itself instead of selecting the cell.
    pub fn consumes_activation(&self) -> bool {
        matches!(self, CellView::Link { .. })
    }

    /// Flattens the view to a single line of text.
    pub fn plain_text(&self) -> String {
        match self {
            CellView::Text(text) | CellView::Placeholder(text) => text.clone(),
            CellView::Tag { label, .. } | CellView::Link { label, .. } => label.clone(),
            CellView::Avatars {
                caption, extra, ..
            } => match extra {
                Some(n) => format!("{} +{}", caption, n),
                None => caption.clone(),
            },
            CellView::Invalid => INVALID_CELL_TYPE.to_string(),
            CellView::Input { value } => value.clone(),
            CellView::UserPicker(picker) => picker
                .selected
                .iter()
                .map(|u| u.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Lets a renderer ask the grid to switch its cell into edit mode.
#[derive(Debug, Default)]
pub struct EditRequest {
    requested: Flag<bool>,
}

impl EditRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests edit mode for the cell being rendered.
    pub fn request(&self) {
        self.requested.set(true);
    }

    /// Returns `true` if the renderer requested edit mode.
    pub fn is_requested(&self) -> bool {
        self.requested.get()
    }
}

/// Rendering strategy for one cell type.
pub trait CellRenderer: Send + Sync {
    /// Renders a cell. Cells of the wrong variant render as [`CellView::Invalid`].
    fn render(&self, cell: &Cell, column: &Column, edit: &EditRequest) -> CellView;
}

/// Rendering used when no strategy is registered for a type.
pub fn render_fallback(cell: &Cell) -> CellView {
    CellView::Text(cell.value().display_string())
}
