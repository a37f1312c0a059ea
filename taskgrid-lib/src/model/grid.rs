//! The table: ordered columns and rows

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::CellType;
use super::CellValue;
use super::Column;
use super::Row;
use crate::error::GridError;

/// A cell whose type differs from its column's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// Row holding the cell.
    pub row_id: String,
    /// Column the cell belongs to.
    pub column_id: String,
    /// Type declared on the column.
    pub expected: CellType,
    /// Type of the cell.
    pub found: CellType,
}

#[derive(Deserialize)]
struct GridParts {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl TryFrom<GridParts> for GridData {
    type Error = GridError;

    fn try_from(parts: GridParts) -> Result<Self, Self::Error> {
        GridData::try_new(parts.columns, parts.rows)
    }
}

/// The authoritative table.
///
/// Rows are held behind `Arc`, so cloning a `GridData` is cheap and a cell
/// update only copies the row it touches. Every other row of the new version
/// is pointer-identical to the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridParts")]
pub struct GridData {
    columns: Vec<Column>,
    rows: Vec<Arc<Row>>,
}

impl GridData {
    /// Builds a table, rejecting duplicate column or row ids.
    ///
    /// Cells whose type differs from their column are kept (they render as
    /// invalid) and logged.
    pub fn try_new(columns: Vec<Column>, rows: Vec<Row>) -> Result<Self, GridError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id.as_str()) {
                return Err(GridError::DuplicateColumn(column.id.clone()));
            }
        }

        let mut seen = HashSet::new();
        for row in &rows {
            if !seen.insert(row.id.as_str()) {
                return Err(GridError::DuplicateRow(row.id.clone()));
            }
        }

        let grid = Self {
            columns,
            rows: rows.into_iter().map(Arc::new).collect(),
        };

        for mismatch in grid.type_mismatches() {
            log::warn!(
                "cell {}/{} is {} but column declares {}",
                mismatch.row_id,
                mismatch.column_id,
                mismatch.found,
                mismatch.expected
            );
        }

        Ok(grid)
    }

    /// Creates an empty table.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Columns in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows in default display order.
    pub fn rows(&self) -> &[Arc<Row>] {
        &self.rows
    }

    /// Finds a column by id.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Finds a row by id.
    pub fn row(&self, id: &str) -> Option<&Arc<Row>> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Returns the position of a row in the default order.
    pub fn row_index(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lists every cell whose type differs from its column's declared type.
    pub fn type_mismatches(&self) -> Vec<TypeMismatch> {
        let mut mismatches = Vec::new();
        for row in &self.rows {
            for column in &self.columns {
                if let Some(cell) = row.cell(&column.id)
                    && cell.cell_type() != column.cell_type
                {
                    mismatches.push(TypeMismatch {
                        row_id: row.id.clone(),
                        column_id: column.id.clone(),
                        expected: column.cell_type,
                        found: cell.cell_type(),
                    });
                }
            }
        }
        mismatches
    }

    /// Single mutation entry point: replaces the value of one cell.
    ///
    /// Only the target row is copied; the cell keeps its type, link target
    /// and editability override. Returns `Ok(false)` without touching
    /// anything when the row or its cell does not exist.
    pub fn update_cell_value(
        &mut self,
        row_id: &str,
        column_id: &str,
        value: CellValue,
    ) -> Result<bool, GridError> {
        let Some(index) = self.row_index(row_id) else {
            return Ok(false);
        };
        let Some(cell) = self.rows[index].cell(column_id) else {
            return Ok(false);
        };
        cell.accepts(&value)?;

        let row = Arc::make_mut(&mut self.rows[index]);
        if let Some(cell) = row.cells.get_mut(column_id) {
            cell.set_value(value)?;
        }
        Ok(true)
    }

    /// Replaces a whole row by id. Returns `false` if the row does not exist.
    pub fn replace_row(&mut self, row: Row) -> bool {
        match self.row_index(&row.id) {
            Some(index) => {
                self.rows[index] = Arc::new(row);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;
    use crate::model::User;

    fn sample() -> GridData {
        GridData::try_new(
            vec![
                Column::new("summary", "Summary", CellType::Text).editable(true),
                Column::new("status", "Status", CellType::Tag),
                Column::new("link", "Link", CellType::Link),
            ],
            vec![
                Row::new("ID-1")
                    .with_cell("summary", Cell::text("first").editable(true))
                    .with_cell("status", Cell::tag("todo"))
                    .with_cell("link", Cell::link("Docs", "https://example.com")),
                Row::new("ID-2")
                    .with_cell("summary", Cell::text("second"))
                    .with_cell("status", Cell::tag("done")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_update_touches_only_target_cell() {
        let before = sample();
        let mut after = before.clone();
        assert!(after.update_cell_value("ID-1", "summary", "changed".into()).unwrap());

        assert!(Arc::ptr_eq(&before.rows()[1], &after.rows()[1]));
        let old = &before.rows()[0];
        let new = &after.rows()[0];
        assert_eq!(new.cell("summary"), Some(&Cell::text("changed").editable(true)));
        assert_eq!(old.cell("summary"), Some(&Cell::text("first").editable(true)));
        assert_eq!(new.cell("status"), old.cell("status"));
        assert_eq!(new.cell("link"), old.cell("link"));
        assert_eq!(new.cells.len(), old.cells.len());
    }

    #[test]
    fn test_update_unknown_ids_is_noop() {
        let before = sample();
        let mut after = before.clone();
        assert!(!after.update_cell_value("ID-9", "summary", "x".into()).unwrap());
        assert!(!after.update_cell_value("ID-2", "link", "x".into()).unwrap());
        assert!(!after.update_cell_value("ID-1", "nope", "x".into()).unwrap());
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_rejects_mismatched_value() {
        let mut grid = sample();
        let result = grid.update_cell_value("ID-1", "status", CellValue::Users(vec![User::new("1", "A")]));
        assert!(matches!(result, Err(GridError::ValueMismatch { .. })));
        assert_eq!(grid, sample());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let columns = vec![
            Column::new("a", "A", CellType::Text),
            Column::new("a", "A again", CellType::Text),
        ];
        assert_eq!(
            GridData::try_new(columns, vec![]).unwrap_err(),
            GridError::DuplicateColumn("a".into())
        );

        let rows = vec![Row::new("r"), Row::new("r")];
        assert_eq!(
            GridData::try_new(vec![], rows).unwrap_err(),
            GridError::DuplicateRow("r".into())
        );
    }

    #[test]
    fn test_type_mismatches_reported() {
        let grid = GridData::try_new(
            vec![Column::new("s", "S", CellType::Text)],
            vec![Row::new("1").with_cell("s", Cell::tag("todo"))],
        )
        .unwrap();
        assert_eq!(
            grid.type_mismatches(),
            vec![TypeMismatch {
                row_id: "1".into(),
                column_id: "s".into(),
                expected: CellType::Text,
                found: CellType::Tag,
            }]
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"columns":[{"id":"a","title":"A","type":"text"},{"id":"a","title":"B","type":"tag"}],"rows":[]}"#;
        assert!(serde_json::from_str::<GridData>(json).is_err());
    }
}
