//! Derived row orderings
//!
//! Sorting never touches the table. [`sort_rows`] returns a new list of the
//! same `Arc<Row>` handles in display order.

use std::cmp::Ordering;
use std::mem;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::CellValue;
use crate::model::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Current sort column and direction. Unsorted by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    column: Option<String>,
    direction: Option<SortDirection>,
}

impl SortState {
    /// Sorts by `column`: flips the direction if it is already the sort
    /// column, otherwise starts ascending.
    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = Some(self.direction.map_or(SortDirection::Asc, SortDirection::reversed));
        } else {
            self.column = Some(column.to_string());
            self.direction = Some(SortDirection::Asc);
        }
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.direction
    }

    /// Returns `(column, direction)` when a sort is active.
    pub fn active(&self) -> Option<(&str, SortDirection)> {
        Some((self.column.as_deref()?, self.direction?))
    }

    pub fn clear(&mut self) {
        self.column = None;
        self.direction = None;
    }
}

/// Returns `rows` ordered by the values in `column_id`.
///
/// The sort is stable. Rows missing the cell keep their slot and the rows
/// that have it are ordered around them. When the column holds values of
/// more than one shape, every value compares by display string.
pub fn sort_rows(rows: &[Arc<Row>], column_id: &str, direction: SortDirection) -> Vec<Arc<Row>> {
    let mut sorted = rows.to_vec();

    let (slots, mut keyed): (Vec<usize>, Vec<(CellValue, Arc<Row>)>) = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let value = row.cell(column_id)?.value();
            Some((i, (value, row.clone())))
        })
        .unzip();

    let uniform = keyed
        .windows(2)
        .all(|w| mem::discriminant(&w[0].0) == mem::discriminant(&w[1].0));

    let apply = |ordering: Ordering| match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    };

    let ordered: Vec<Arc<Row>> = if uniform {
        keyed.sort_by(|(a, _), (b, _)| apply(compare_values(a, b)));
        keyed.into_iter().map(|(_, row)| row).collect()
    } else {
        let mut labelled: Vec<(String, Arc<Row>)> = keyed
            .into_iter()
            .map(|(value, row)| (value.display_string(), row))
            .collect();
        labelled.sort_by(|(a, _), (b, _)| apply(locale_compare(a, b)));
        labelled.into_iter().map(|(_, row)| row).collect()
    };

    for (slot, row) in slots.into_iter().zip(ordered) {
        sorted[slot] = row;
    }
    sorted
}

/// Compares two cell values.
///
/// Text compares with [`locale_compare`], numbers numerically, user lists by
/// length. Anything else compares by display string. This is a total order
/// only among values of one shape; [`sort_rows`] handles mixed columns.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Text(a), CellValue::Text(b)) => locale_compare(a, b),
        (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
        (CellValue::Users(a), CellValue::Users(b)) => a.len().cmp(&b.len()),
        _ => locale_compare(&a.display_string(), &b.display_string()),
    }
}

/// Language-neutral collation in three levels.
///
/// 1. Base letters, ignoring case and accents.
/// 2. Accents.
/// 3. Case, lowercase first.
///
/// Within the base level whitespace sorts before punctuation, punctuation
/// before symbols, symbols before digits and digits before letters.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let (a_base, a_marks, a_case) = collation_keys(a);
    let (b_base, b_marks, b_case) = collation_keys(b);

    a_base
        .cmp(&b_base)
        .then_with(|| a_marks.cmp(&b_marks))
        .then_with(|| a_case.cmp(&b_case))
        .then_with(|| a.cmp(b))
}

type BaseKey = Vec<(u8, char)>;
type MarkKey = Vec<Vec<char>>;
type CaseKey = Vec<bool>;

fn collation_keys(s: &str) -> (BaseKey, MarkKey, CaseKey) {
    let mut base = Vec::new();
    let mut marks: MarkKey = Vec::new();
    let mut case = Vec::new();

    for c in s.nfd() {
        if is_combining_mark(c) {
            if let Some(last) = marks.last_mut() {
                last.push(c);
            }
            continue;
        }
        for lower in c.to_lowercase() {
            base.push((char_class(lower), lower));
            marks.push(Vec::new());
            case.push(c.is_uppercase());
        }
    }

    (base, marks, case)
}

fn char_class(c: char) -> u8 {
    if c.is_whitespace() {
        0
    } else if c.is_ascii_punctuation() && !is_symbol(c) {
        1
    } else if is_symbol(c) || (!c.is_alphanumeric() && !c.is_whitespace()) {
        2
    } else if c.is_numeric() {
        3
    } else {
        4
    }
}

fn is_symbol(c: char) -> bool {
    matches!(c, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;
    use crate::model::User;

    fn rows(values: &[&str]) -> Vec<Arc<Row>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Arc::new(Row::new(format!("r{}", i)).with_cell("c", Cell::text(*v))))
            .collect()
    }

    fn ids(rows: &[Arc<Row>]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_toggle() {
        let mut state = SortState::default();
        assert_eq!(state.active(), None);

        state.toggle("a");
        assert_eq!(state.active(), Some(("a", SortDirection::Asc)));
        state.toggle("a");
        assert_eq!(state.active(), Some(("a", SortDirection::Desc)));
        state.toggle("b");
        assert_eq!(state.active(), Some(("b", SortDirection::Asc)));
    }

    #[test]
    fn test_locale_compare_levels() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("resume", "résumé"), Ordering::Less);
        assert_eq!(locale_compare("résumé", "rf"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
        assert_eq!(locale_compare("10", "a"), Ordering::Less);
        assert_eq!(locale_compare("", "a"), Ordering::Less);
    }

    #[test]
    fn test_sort_text_and_reverse() {
        let rows = rows(&["done", "blocked", "todo", "in-progress"]);
        let asc = sort_rows(&rows, "c", SortDirection::Asc);
        let desc = sort_rows(&rows, "c", SortDirection::Desc);

        assert_eq!(ids(&asc), vec!["r1", "r0", "r3", "r2"]);
        let mut reversed = ids(&desc);
        reversed.reverse();
        assert_eq!(ids(&asc), reversed);
        assert_eq!(ids(&sort_rows(&asc, "c", SortDirection::Asc)), ids(&asc));
    }

    #[test]
    fn test_sort_does_not_touch_input() {
        let rows = rows(&["b", "a"]);
        let sorted = sort_rows(&rows, "c", SortDirection::Asc);
        assert_eq!(ids(&rows), vec!["r0", "r1"]);
        assert!(Arc::ptr_eq(&rows[0], &sorted[1]));
    }

    #[test]
    fn test_missing_cells_keep_their_slot() {
        let rows = vec![
            Arc::new(Row::new("a").with_cell("c", Cell::text("z"))),
            Arc::new(Row::new("b")),
            Arc::new(Row::new("c").with_cell("c", Cell::text("y"))),
            Arc::new(Row::new("d").with_cell("c", Cell::text("x"))),
        ];
        assert_eq!(ids(&sort_rows(&rows, "missing", SortDirection::Desc)), vec!["a", "b", "c", "d"]);
        assert_eq!(ids(&sort_rows(&rows, "c", SortDirection::Asc)), vec!["d", "b", "c", "a"]);
        assert_eq!(ids(&sort_rows(&rows, "c", SortDirection::Desc)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_mixed_shapes_sort_by_display_string() {
        let rows = vec![
            Arc::new(Row::new("n10").with_cell("c", Cell::number(10.0))),
            Arc::new(Row::new("t9").with_cell("c", Cell::text("9.5"))),
            Arc::new(Row::new("n2").with_cell("c", Cell::number(2.0))),
        ];
        // "10" < "2" < "9.5" as strings
        assert_eq!(ids(&sort_rows(&rows, "c", SortDirection::Asc)), vec!["n10", "n2", "t9"]);
        assert_eq!(ids(&sort_rows(&rows, "c", SortDirection::Desc)), vec!["t9", "n2", "n10"]);
    }

    #[test]
    fn test_large_mixed_column_sorts_in_both_directions() {
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        let rows: Vec<Arc<Row>> = (0..2000)
            .map(|i| {
                let v = (next() % 1000) as f64;
                let cell = match next() % 3 {
                    0 => Cell::number(v),
                    1 => Cell::text(format!("{}", v + 0.5)),
                    _ => return Arc::new(Row::new(format!("r{}", i))),
                };
                Arc::new(Row::new(format!("r{}", i)).with_cell("c", cell))
            })
            .collect();

        let asc = sort_rows(&rows, "c", SortDirection::Asc);
        let desc = sort_rows(&rows, "c", SortDirection::Desc);
        assert_eq!(asc.len(), rows.len());
        assert_eq!(desc.len(), rows.len());

        let labels = |sorted: &[Arc<Row>]| -> Vec<String> {
            sorted
                .iter()
                .filter_map(|r| r.cell("c").map(|c| c.value().display_string()))
                .collect()
        };
        let asc_labels = labels(&asc);
        assert!(asc_labels.windows(2).all(|w| locale_compare(&w[0], &w[1]) != Ordering::Greater));
        let desc_labels = labels(&desc);
        assert!(desc_labels.windows(2).all(|w| locale_compare(&w[0], &w[1]) != Ordering::Less));
    }

    #[test]
    fn test_compare_values_by_shape() {
        assert_eq!(
            compare_values(&CellValue::Number(2.0), &CellValue::Number(10.0)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&CellValue::Number(f64::NAN), &CellValue::Number(1.0)),
            Ordering::Greater
        );

        let one = CellValue::Users(vec![User::new("u1", "Zed")]);
        let two = CellValue::Users(vec![User::new("u2", "Amy"), User::new("u3", "Bo")]);
        assert_eq!(compare_values(&one, &two), Ordering::Less);

        let user = CellValue::User(User::new("u1", "Amy"));
        assert_eq!(compare_values(&user, &CellValue::Text("bob".into())), Ordering::Less);
    }
}
