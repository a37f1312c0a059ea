use super::CellRenderer;
use super::CellView;
use super::EditRequest;
use crate::model::Cell;
use crate::model::CellContent;
use crate::model::Column;

/// Renders link cells as a hyperlink to `href`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkRenderer;

impl CellRenderer for LinkRenderer {
    fn render(&self, cell: &Cell, _column: &Column, _edit: &EditRequest) -> CellView {
        match &cell.content {
            CellContent::Link { value, href } => CellView::Link {
                label: value.clone(),
                href: href.clone(),
            },
            _ => CellView::Invalid,
        }
    }
}
