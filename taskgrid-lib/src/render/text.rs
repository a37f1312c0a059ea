use super::CellRenderer;
use super::CellView;
use super::EditRequest;
use crate::model::Cell;
use crate::model::CellContent;
use crate::model::Column;

/// Renders text cells as their raw string.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl CellRenderer for TextRenderer {
    fn render(&self, cell: &Cell, _column: &Column, _edit: &EditRequest) -> CellView {
        match &cell.content {
            CellContent::Text { value } => CellView::Text(value.clone()),
            _ => CellView::Invalid,
        }
    }
}
