use super::CellEditor;
use super::EditInput;
use super::EditOutcome;
use super::EditSession;
use super::InvalidSession;
use crate::model::Cell;
use crate::model::CellContent;
use crate::model::CellValue;
use crate::model::Column;
use crate::render::CellView;

/// Single-line editor for text cells.
///
/// Enter and click-away both commit the draft; Escape discards it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextEditor;

impl CellEditor for TextEditor {
    fn edit(&self, cell: &Cell, _column: &Column) -> Box<dyn EditSession> {
        match &cell.content {
            CellContent::Text { value } => Box::new(TextSession::new(value.clone())),
            _ => Box::new(InvalidSession),
        }
    }
}

/// Draft state of a [`TextEditor`].
#[derive(Debug, Clone)]
pub struct TextSession {
    draft: String,
}

impl TextSession {
    pub fn new(draft: String) -> Self {
        Self { draft }
    }

    /// Current draft.
    pub fn draft(&self) -> &str {
        &self.draft
    }
}

impl EditSession for TextSession {
    fn handle(&mut self, input: EditInput) -> EditOutcome {
        match input {
            EditInput::Char(c) => self.draft.push(c),
            EditInput::Backspace => {
                self.draft.pop();
            }
            EditInput::SetText(text) => self.draft = text,
            EditInput::Enter | EditInput::Blur => {
                return EditOutcome::Save(CellValue::Text(self.draft.clone()));
            }
            EditInput::Escape => return EditOutcome::Cancel,
            EditInput::Select(_) | EditInput::Remove(_) | EditInput::Toggle(_) => {}
        }
        EditOutcome::Continue
    }

    fn view(&self) -> CellView {
        CellView::Input {
            value: self.draft.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellType;

    fn column() -> Column {
        Column::new("summary", "Summary", CellType::Text).editable(true)
    }

    #[test]
    fn test_draft_seeded_from_cell() {
        let session = TextEditor.edit(&Cell::text("draft me"), &column());
        assert_eq!(session.view(), CellView::Input { value: "draft me".into() });
    }

    #[test]
    fn test_enter_and_blur_commit() {
        let mut session = TextEditor.edit(&Cell::text("a"), &column());
        assert_eq!(session.handle(EditInput::Char('b')), EditOutcome::Continue);
        assert_eq!(session.handle(EditInput::Enter), EditOutcome::Save("ab".into()));

        let mut session = TextEditor.edit(&Cell::text("a"), &column());
        session.handle(EditInput::Backspace);
        assert_eq!(session.handle(EditInput::Blur), EditOutcome::Save("".into()));
    }

    #[test]
    fn test_escape_discards() {
        let mut session = TextEditor.edit(&Cell::text("a"), &column());
        session.handle(EditInput::SetText("changed".into()));
        assert_eq!(session.handle(EditInput::Escape), EditOutcome::Cancel);
    }

    #[test]
    fn test_wrong_variant_is_invalid() {
        let mut session = TextEditor.edit(&Cell::tag("todo"), &column());
        assert_eq!(session.view(), CellView::Invalid);
        assert_eq!(session.handle(EditInput::Enter), EditOutcome::Continue);
    }
}
