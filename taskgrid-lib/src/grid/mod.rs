//! Interactive grid state
//!
//! [`DataGrid`] owns the table, the strategy registry and everything the user
//! changes while working with it: the focused cell and its edit session,
//! checked rows, sort order and column widths. All methods take `&mut self`
//! and are meant to be driven from one event loop.

mod selection;
mod widths;

pub use selection::*;
pub use widths::*;

use std::sync::Arc;

use crate::edit::EditInput;
use crate::edit::EditOutcome;
use crate::edit::EditSession;
use crate::edit::InvalidSession;
use crate::error::GridError;
use crate::model::CellType;
use crate::model::CellValue;
use crate::model::Column;
use crate::model::ColumnWidth;
use crate::model::GridData;
use crate::model::Row;
use crate::registry::PluginRegistry;
use crate::render::CellView;
use crate::render::EditRequest;
use crate::render::render_fallback;
use crate::sort::SortDirection;
use crate::sort::SortState;
use crate::sort::sort_rows;

// =============================================================================
// Types
// =============================================================================

/// Address of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row_id: String,
    pub column_id: String,
}

impl CellRef {
    pub fn new(row_id: impl Into<String>, column_id: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            column_id: column_id.into(),
        }
    }

    fn is(&self, row_id: &str, column_id: &str) -> bool {
        self.row_id == row_id && self.column_id == column_id
    }
}

/// Interaction state of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Idle,
    Selected,
    Editing,
}

/// Which part of the cell a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickTarget {
    /// The cell box.
    #[default]
    Cell,
    /// Interactive content inside the cell, such as a link.
    Content,
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickResult {
    /// The cell is now selected.
    Selected,
    /// The cell is now (or still) being edited.
    Editing,
    /// The click hit a link. The host should open it; selection is unchanged.
    OpenLink(String),
    /// No such row or column.
    Ignored,
}

/// A committed edit waiting to be sent to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub row_id: String,
    pub column_id: String,
    pub value: CellValue,
}

/// Non-fatal problem found while rendering a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderIssue {
    /// The cell's type differs from its column's.
    InvalidCellType { expected: CellType, found: CellType },
    /// No renderer is registered for the column type; the raw value is shown.
    MissingStrategy(CellType),
    /// The row has no cell for the column.
    MissingCell,
}

/// A cell ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell {
    pub view: CellView,
    pub state: CellState,
    pub issue: Option<RenderIssue>,
}

enum Interaction {
    Idle,
    Selected(CellRef),
    Editing {
        cell: CellRef,
        session: Box<dyn EditSession>,
    },
}

impl Interaction {
    fn cell(&self) -> Option<&CellRef> {
        match self {
            Interaction::Idle => None,
            Interaction::Selected(cell) | Interaction::Editing { cell, .. } => Some(cell),
        }
    }
}

// =============================================================================
// DataGrid
// =============================================================================

/// A table plus its interaction state.
pub struct DataGrid {
    data: GridData,
    registry: PluginRegistry,
    interaction: Interaction,
    row_selection: RowSelection,
    sort: SortState,
    widths: ColumnWidths,
    outbox: Vec<CellUpdate>,
}

impl DataGrid {
    pub fn new(data: GridData, registry: PluginRegistry) -> Self {
        Self {
            data,
            registry,
            interaction: Interaction::Idle,
            row_selection: RowSelection::new(),
            sort: SortState::default(),
            widths: ColumnWidths::new(),
            outbox: Vec::new(),
        }
    }

    /// Restores saved column widths.
    pub fn with_column_widths(mut self, widths: ColumnWidths) -> Self {
        self.widths = widths;
        self
    }

    pub fn data(&self) -> &GridData {
        &self.data
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    /// Swaps in a freshly fetched table.
    ///
    /// Any open edit session is dropped. Checked rows that no longer exist are
    /// unchecked, and the cell selection is cleared if its cell is gone.
    pub fn set_data(&mut self, data: GridData) {
        self.data = data;
        self.row_selection
            .retain_existing(self.data.rows().iter().map(|r| r.id.as_str()));

        let keep = self.interaction.cell().and_then(|cell| {
            (self.data.row(&cell.row_id).is_some() && self.data.column(&cell.column_id).is_some())
                .then(|| cell.clone())
        });
        self.interaction = match keep {
            Some(cell) => Interaction::Selected(cell),
            None => Interaction::Idle,
        };
    }

    // -------------------------------------------------------------------------
    // Selection and editing
    // -------------------------------------------------------------------------

    /// The selected cell, if any.
    pub fn selected_cell(&self) -> Option<&CellRef> {
        self.interaction.cell()
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.interaction, Interaction::Editing { .. })
    }

    pub fn cell_state(&self, row_id: &str, column_id: &str) -> CellState {
        match &self.interaction {
            Interaction::Selected(cell) if cell.is(row_id, column_id) => CellState::Selected,
            Interaction::Editing { cell, .. } if cell.is(row_id, column_id) => CellState::Editing,
            _ => CellState::Idle,
        }
    }

    /// Handles a click on a cell.
    ///
    /// The cell becomes selected, dropping any other cell's edit session
    /// without saving. If the column and cell are editable and an editor is
    /// registered for the column type, editing starts. Clicking the cell being
    /// edited keeps the session. A click on link content selects nothing.
    pub fn click(&mut self, row_id: &str, column_id: &str, target: ClickTarget) -> ClickResult {
        let Some(column) = self.data.column(column_id).cloned() else {
            return ClickResult::Ignored;
        };
        let Some(row) = self.data.row(row_id).cloned() else {
            return ClickResult::Ignored;
        };

        if self.cell_state(row_id, column_id) == CellState::Editing {
            return ClickResult::Editing;
        }

        if target == ClickTarget::Content
            && let CellView::Link { href, .. } = self.render_cell(row_id, column_id).view
        {
            log::debug!("opening link {}", href);
            return ClickResult::OpenLink(href);
        }

        let cell_ref = CellRef::new(row_id, column_id);
        match self.open_session(&row, &column) {
            Some(session) => {
                log::debug!("editing {}/{}", row_id, column_id);
                self.interaction = Interaction::Editing {
                    cell: cell_ref,
                    session,
                };
                ClickResult::Editing
            }
            None => {
                self.interaction = Interaction::Selected(cell_ref);
                ClickResult::Selected
            }
        }
    }

    /// Starts editing the selected cell, as if a renderer had requested it.
    ///
    /// Returns `false` if nothing is selected or the cell cannot be edited.
    pub fn begin_edit(&mut self) -> bool {
        let Interaction::Selected(cell) = &self.interaction else {
            return false;
        };
        let cell = cell.clone();
        let (Some(row), Some(column)) = (
            self.data.row(&cell.row_id).cloned(),
            self.data.column(&cell.column_id).cloned(),
        ) else {
            return false;
        };
        match self.open_session(&row, &column) {
            Some(session) => {
                self.interaction = Interaction::Editing { cell, session };
                true
            }
            None => false,
        }
    }

    fn open_session(&self, row: &Row, column: &Column) -> Option<Box<dyn EditSession>> {
        let cell = row.cell(&column.id)?;
        if !column.editable || !cell.is_editable() {
            return None;
        }
        let editor = self.registry.editor(column.cell_type)?;
        if cell.cell_type() != column.cell_type {
            return Some(Box::new(InvalidSession));
        }
        Some(editor.edit(cell, column))
    }

    /// Sends input to the open edit session.
    ///
    /// Returns `Ok(None)` when nothing is being edited. A save commits through
    /// [`update_cell_value`](Self::update_cell_value) and returns to
    /// `Selected`, as does a cancel. A save whose value does not fit the cell
    /// also returns to `Selected` and reports the error.
    pub fn handle_input(&mut self, input: EditInput) -> Result<Option<EditOutcome>, GridError> {
        let Interaction::Editing { session, .. } = &mut self.interaction else {
            return Ok(None);
        };

        let outcome = session.handle(input);
        if outcome == EditOutcome::Continue {
            return Ok(Some(outcome));
        }

        let Interaction::Editing { cell, .. } =
            std::mem::replace(&mut self.interaction, Interaction::Idle)
        else {
            return Ok(Some(outcome));
        };
        self.interaction = Interaction::Selected(cell.clone());

        if let EditOutcome::Save(value) = &outcome {
            self.update_cell_value(&cell.row_id, &cell.column_id, value.clone())?;
        }
        Ok(Some(outcome))
    }

    /// Handles an interaction outside any cell. An open session receives
    /// [`EditInput::Blur`], which commits for the built-in editors.
    pub fn click_away(&mut self) -> Result<Option<EditOutcome>, GridError> {
        self.handle_input(EditInput::Blur)
    }

    /// Clears the cell selection, dropping any edit session unsaved.
    pub fn clear_selection(&mut self) {
        self.interaction = Interaction::Idle;
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Replaces one cell's value and queues the change for the server.
    ///
    /// Unknown row or column ids are ignored. Returns `Ok(true)` if a cell
    /// changed.
    pub fn update_cell_value(
        &mut self,
        row_id: &str,
        column_id: &str,
        value: CellValue,
    ) -> Result<bool, GridError> {
        let changed = self
            .data
            .update_cell_value(row_id, column_id, value.clone())?;
        if changed {
            self.outbox.push(CellUpdate {
                row_id: row_id.to_string(),
                column_id: column_id.to_string(),
                value,
            });
        }
        Ok(changed)
    }

    /// Takes the committed edits queued since the last call.
    pub fn drain_updates(&mut self) -> Vec<CellUpdate> {
        std::mem::take(&mut self.outbox)
    }

    /// Replaces a row with the server's copy.
    pub fn replace_row(&mut self, row: Row) -> bool {
        self.data.replace_row(row)
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Renders one cell.
    ///
    /// Never fails: a mismatched cell shows the invalid placeholder, a type
    /// without a renderer shows its raw value, and a missing cell shows an
    /// empty placeholder. A renderer asking for edit mode is ignored here;
    /// use [`render_cell_mut`](Self::render_cell_mut) to honor it.
    pub fn render_cell(&self, row_id: &str, column_id: &str) -> RenderedCell {
        self.render_with(row_id, column_id, &EditRequest::new())
    }

    /// Renders one cell and starts editing it if its renderer asks to.
    pub fn render_cell_mut(&mut self, row_id: &str, column_id: &str) -> RenderedCell {
        let request = EditRequest::new();
        let rendered = self.render_with(row_id, column_id, &request);
        if request.is_requested() && rendered.state != CellState::Editing {
            self.interaction = Interaction::Selected(CellRef::new(row_id, column_id));
            if self.begin_edit() {
                return self.render_cell(row_id, column_id);
            }
        }
        rendered
    }

    fn render_with(&self, row_id: &str, column_id: &str, request: &EditRequest) -> RenderedCell {
        let state = self.cell_state(row_id, column_id);

        let (Some(row), Some(column)) = (self.data.row(row_id), self.data.column(column_id)) else {
            return RenderedCell {
                view: CellView::Placeholder(String::new()),
                state,
                issue: Some(RenderIssue::MissingCell),
            };
        };
        let Some(cell) = row.cell(column_id) else {
            return RenderedCell {
                view: CellView::Placeholder(String::new()),
                state,
                issue: Some(RenderIssue::MissingCell),
            };
        };

        if cell.cell_type() != column.cell_type {
            return RenderedCell {
                view: CellView::Invalid,
                state,
                issue: Some(RenderIssue::InvalidCellType {
                    expected: column.cell_type,
                    found: cell.cell_type(),
                }),
            };
        }

        if let Interaction::Editing { cell, session } = &self.interaction
            && cell.is(row_id, column_id)
        {
            return RenderedCell {
                view: session.view(),
                state,
                issue: None,
            };
        }

        match self.registry.renderer(column.cell_type) {
            Some(renderer) => RenderedCell {
                view: renderer.render(cell, column, request),
                state,
                issue: None,
            },
            None => RenderedCell {
                view: render_fallback(cell),
                state,
                issue: Some(RenderIssue::MissingStrategy(column.cell_type)),
            },
        }
    }

    // -------------------------------------------------------------------------
    // Row selection
    // -------------------------------------------------------------------------

    /// Checks or unchecks a row. Returns `true` if it is now checked.
    pub fn toggle_row(&mut self, row_id: &str) -> bool {
        self.row_selection.toggle(row_id)
    }

    /// Checks every row, or none.
    pub fn select_all_rows(&mut self, selected: bool) {
        if selected {
            self.row_selection
                .select_all(self.data.rows().iter().map(|r| r.id.as_str()));
        } else {
            self.row_selection.clear();
        }
    }

    pub fn is_row_selected(&self, row_id: &str) -> bool {
        self.row_selection.is_selected(row_id)
    }

    pub fn selected_row_count(&self) -> usize {
        self.row_selection.len()
    }

    pub fn selected_rows(&self) -> Vec<String> {
        self.row_selection.selected()
    }

    /// Returns `true` if the table has rows and all of them are checked.
    pub fn all_rows_selected(&self) -> bool {
        !self.data.is_empty() && self.row_selection.len() == self.data.rows().len()
    }

    /// Deletion is not supported by the backend. Logs the checked rows and
    /// unchecks them; the table is left as is. Returns the ids that were
    /// checked.
    pub fn delete_selected_rows(&mut self) -> Vec<String> {
        let ids = self.row_selection.clear();
        log::info!("delete requested for rows {:?}; deletion is not supported", ids);
        ids
    }

    // -------------------------------------------------------------------------
    // Columns and sorting
    // -------------------------------------------------------------------------

    /// Width for a column: the user's override, else the column's default.
    pub fn column_width(&self, column_id: &str) -> Option<ColumnWidth> {
        self.widths
            .get(column_id)
            .cloned()
            .or_else(|| self.data.column(column_id)?.width.clone())
    }

    pub fn set_column_width(&mut self, column_id: &str, width: impl Into<ColumnWidth>) {
        self.widths.set(column_id, width);
    }

    /// Overrides to persist.
    pub fn column_widths(&self) -> &ColumnWidths {
        &self.widths
    }

    /// Sorts by a column, flipping the direction when it is already the sort
    /// column.
    pub fn sort_by_column(&mut self, column_id: &str) {
        self.sort.toggle(column_id);
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Current sort column and direction, if any.
    pub fn current_sort(&self) -> Option<(&str, SortDirection)> {
        self.sort.active()
    }

    /// Rows in display order. Unsorted, or sorted by an unknown column, this
    /// is table order.
    pub fn sorted_rows(&self) -> Vec<Arc<Row>> {
        match self.sort.active() {
            Some((column_id, direction)) if self.data.column(column_id).is_some() => {
                sort_rows(self.data.rows(), column_id, direction)
            }
            _ => self.data.rows().to_vec(),
        }
    }
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("columns", &self.data.columns().len())
            .field("rows", &self.data.rows().len())
            .field("selected", &self.interaction.cell())
            .field("editing", &self.is_editing())
            .field("sort", &self.sort)
            .finish_non_exhaustive()
    }
}
