//! Cell editors
//!
//! An editor opens an [`EditSession`] over one cell. The session owns the
//! draft, reacts to [`EditInput`]s and reports whether to keep editing, save
//! a value or cancel. The grid applies the outcome.

mod multi_user;
mod text;

pub use multi_user::*;
pub use text::*;

use crate::model::Cell;
use crate::model::CellValue;
use crate::model::Column;
use crate::model::User;
use crate::render::CellView;

/// Input delivered to an edit session.
#[derive(Debug, Clone, PartialEq)]
pub enum EditInput {
    /// A typed character.
    Char(char),
    /// Delete the last character of the text input.
    Backspace,
    /// Replace the whole text input.
    SetText(String),
    /// Enter key.
    Enter,
    /// Escape key.
    Escape,
    /// Focus left the editor (click-away).
    Blur,
    /// Add a user to the draft.
    Select(User),
    /// Remove a user from the draft by id.
    Remove(String),
    /// Add the user if absent, remove it otherwise.
    Toggle(User),
}

/// Result of handling one input.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Keep editing.
    Continue,
    /// Commit this value.
    Save(CellValue),
    /// Discard the draft.
    Cancel,
}

/// An open editor over one cell.
pub trait EditSession: Send {
    /// Handles one input.
    fn handle(&mut self, input: EditInput) -> EditOutcome;

    /// Current editable surface.
    fn view(&self) -> CellView;
}

/// Editing strategy for one cell type.
pub trait CellEditor: Send + Sync {
    /// Opens a session. Cells of the wrong variant get an [`InvalidSession`].
    fn edit(&self, cell: &Cell, column: &Column) -> Box<dyn EditSession>;
}

/// Session opened on a cell the editor cannot handle. Shows the invalid
/// placeholder and ignores every input.
#[derive(Debug, Default, Clone, Copy)]
pub struct InvalidSession;

impl EditSession for InvalidSession {
    fn handle(&mut self, _input: EditInput) -> EditOutcome {
        EditOutcome::Continue
    }

    fn view(&self) -> CellView {
        CellView::Invalid
    }
}
