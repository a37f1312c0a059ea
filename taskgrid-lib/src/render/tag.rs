//! Status tag renderer

use super::CellRenderer;
use super::CellView;
use super::EditRequest;
use super::Rgb;
use crate::model::Cell;
use crate::model::CellContent;
use crate::model::Column;

/// Colors of a tag chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagStyle {
    pub background: Rgb,
    pub foreground: Rgb,
    pub border: Rgb,
}

impl TagStyle {
    const fn new(background: u32, foreground: u32, border: u32) -> Self {
        Self {
            background: Rgb::hex(background),
            foreground: Rgb::hex(foreground),
            border: Rgb::hex(border),
        }
    }

    /// Style for tags outside the status table.
    pub const NEUTRAL: TagStyle = TagStyle::new(0xf5f5f5, 0x616161, 0xe0e0e0);
}

const STATUS_STYLES: [(&str, TagStyle); 4] = [
    ("todo", TagStyle::new(0xe3f2fd, 0x0d47a1, 0xbbdefb)),
    ("in-progress", TagStyle::new(0xfff8e1, 0xe65100, 0xffe082)),
    ("done", TagStyle::new(0xe8f5e9, 0x1b5e20, 0xc8e6c9)),
    ("blocked", TagStyle::new(0xffebee, 0xb71c1c, 0xffcdd2)),
];

/// Looks up the chip style for a tag, case-insensitively.
pub fn tag_style(tag: &str) -> TagStyle {
    let key = tag.to_lowercase();
    STATUS_STYLES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, style)| *style)
        .unwrap_or(TagStyle::NEUTRAL)
}

/// Renders tag cells as colored chips.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagRenderer;

impl CellRenderer for TagRenderer {
    fn render(&self, cell: &Cell, _column: &Column, _edit: &EditRequest) -> CellView {
        match &cell.content {
            CellContent::Tag { value } => CellView::Tag {
                label: value.clone(),
                style: tag_style(value),
            },
            _ => CellView::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(tag_style("DONE"), tag_style("done"));
        assert_eq!(tag_style("In-Progress").foreground, Rgb::hex(0xe65100));
    }

    #[test]
    fn test_unknown_tags_are_neutral() {
        assert_eq!(tag_style("someday"), TagStyle::NEUTRAL);
        assert_eq!(tag_style(""), TagStyle::NEUTRAL);
        assert_eq!(tag_style("someday"), tag_style("later"));
    }
}
