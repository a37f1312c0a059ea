//! Terminal rendering of a grid

use std::fmt::Write;

use crossterm::style::Color;
use crossterm::style::Stylize;
use taskgrid_lib::DataGrid;
use taskgrid_lib::grid::RenderIssue;
use taskgrid_lib::model::ColumnWidth;
use taskgrid_lib::model::User;
use taskgrid_lib::render::CellView;
use taskgrid_lib::render::Rgb;
use taskgrid_lib::sort::SortDirection;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Pixels per terminal column when converting CSS widths.
const PX_PER_CHAR: f64 = 8.0;
const MIN_CHARS: usize = 4;
const MAX_CHARS: usize = 48;
const DEFAULT_CHARS: usize = 16;

const SEPARATOR: &str = " │ ";

/// Terminal width for a column.
pub fn column_chars(width: Option<&ColumnWidth>) -> usize {
    width
        .and_then(ColumnWidth::pixels)
        .map(|px| ((px / PX_PER_CHAR).round() as usize).clamp(MIN_CHARS, MAX_CHARS))
        .unwrap_or(DEFAULT_CHARS)
}

/// Pads or truncates `text` to exactly `width` display columns.
pub fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let mut out = text.to_string();
        out.push_str(&" ".repeat(width - text.width()));
        return out;
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    if width > 0 {
        out.push('…');
        used += 1;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Renders one cell view to exactly `width` columns.
fn paint(view: &CellView, width: usize, styled: bool) -> String {
    let text = fit(&view.plain_text(), width);
    if !styled {
        return text;
    }
    match view {
        CellView::Tag { style, .. } => text
            .with(color(style.foreground))
            .on(color(style.background))
            .to_string(),
        CellView::Link { .. } => text.underlined().blue().to_string(),
        CellView::Placeholder(_) => text.dim().to_string(),
        CellView::Invalid => text.red().italic().to_string(),
        _ => text,
    }
}

/// Renders the grid in display order as a text table.
pub fn render(grid: &DataGrid, styled: bool) -> String {
    let columns = grid.data().columns();
    let widths: Vec<usize> = columns
        .iter()
        .map(|c| column_chars(grid.column_width(&c.id).as_ref()))
        .collect();

    let mut out = String::new();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, &width)| {
            let marker = match grid.current_sort() {
                Some((id, SortDirection::Asc)) if id == column.id => " ▲",
                Some((id, SortDirection::Desc)) if id == column.id => " ▼",
                _ => "",
            };
            let label = fit(&format!("{}{}", column.title, marker), width);
            if styled { label.bold().to_string() } else { label }
        })
        .collect();
    let _ = writeln!(out, "{}", header.join(SEPARATOR));

    let rule: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();
    let _ = writeln!(out, "{}", rule.join("─┼─"));

    for row in grid.sorted_rows() {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| {
                let rendered = grid.render_cell(&row.id, &column.id);
                if let Some(RenderIssue::MissingStrategy(cell_type)) = &rendered.issue {
                    log::debug!("no renderer for {:?} in {}/{}", cell_type, row.id, column.id);
                }
                paint(&rendered.view, width, styled)
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join(SEPARATOR));
    }

    out
}

/// Renders a user list, one per line.
pub fn render_users(users: &[User]) -> String {
    let mut out = String::new();
    for user in users {
        let _ = write!(out, "{:>4}  {}", user.id, fit(&user.name, 28));
        if let Some(email) = &user.email {
            let _ = write!(out, "  {}", email);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use taskgrid_lib::PluginRegistry;
    use taskgrid_lib::directory::UserDirectory;
    use taskgrid_lib::error::LookupError;
    use taskgrid_lib::model::Cell;
    use taskgrid_lib::model::CellType;
    use taskgrid_lib::model::Column;
    use taskgrid_lib::model::GridData;
    use taskgrid_lib::model::Row;

    use super::*;

    struct NoUsers;

    #[async_trait::async_trait]
    impl UserDirectory for NoUsers {
        async fn search_users(&self, _query: &str) -> Result<Vec<User>, LookupError> {
            Ok(Vec::new())
        }
    }

    fn grid() -> DataGrid {
        let columns = vec![
            Column::new("id", "ID", CellType::Text).width("80px"),
            Column::new("status", "Status", CellType::Tag).width("96px"),
        ];
        let rows = vec![
            Row::new("a")
                .with_cell("id", Cell::text("a"))
                .with_cell("status", Cell::tag("todo")),
            Row::new("b")
                .with_cell("id", Cell::text("b"))
                .with_cell("status", Cell::text("oops")),
        ];
        let data = GridData::try_new(columns, rows).unwrap();
        DataGrid::new(data, PluginRegistry::with_defaults(Arc::new(NoUsers)))
    }

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("日本語", 4), "日… ");
        assert_eq!(fit("", 0), "");
    }

    #[test]
    fn test_column_chars() {
        assert_eq!(column_chars(Some(&ColumnWidth::Css("80px".into()))), 10);
        assert_eq!(column_chars(Some(&ColumnWidth::Pixels(1000.0))), MAX_CHARS);
        assert_eq!(column_chars(Some(&ColumnWidth::Css("20%".into()))), DEFAULT_CHARS);
        assert_eq!(column_chars(None), DEFAULT_CHARS);
    }

    #[test]
    fn test_render_plain_table() {
        let mut grid = grid();
        grid.sort_by_column("id");
        grid.sort_by_column("id");

        let out = render(&grid, false);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID ▼"));
        assert!(lines[2].starts_with("b "));
        assert!(lines[2].contains("Invalid cel…"));
        assert!(lines[3].contains("todo"));
    }
}
