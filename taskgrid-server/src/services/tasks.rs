//! Task table service

use taskgrid_lib::error::GridError;
use taskgrid_lib::model::CellValue;
use taskgrid_lib::model::GridData;
use taskgrid_lib::model::Row;
use tokio::sync::RwLock;

use crate::cache::JsonCache;
use crate::error::AppError;
use crate::validation::validate_user;

const ALL_KEY: &str = "tasks:all";

fn row_key(id: &str) -> String {
    format!("task:row:{}", id)
}

/// Owns the task table and serves it through the cache.
#[derive(Debug)]
pub struct TaskService {
    data: RwLock<GridData>,
    cache: JsonCache,
}

impl TaskService {
    pub fn new(data: GridData, cache: JsonCache) -> Self {
        Self {
            data: RwLock::new(data),
            cache,
        }
    }

    /// The whole table.
    pub async fn all(&self) -> GridData {
        if let Some(grid) = self.cache.get::<GridData>(ALL_KEY).await {
            return grid;
        }
        let grid = self.data.read().await.clone();
        self.cache.set(ALL_KEY, &grid).await;
        grid
    }

    /// One row by id.
    pub async fn row(&self, id: &str) -> Result<Row, AppError> {
        let key = row_key(id);
        if let Some(row) = self.cache.get::<Row>(&key).await {
            return Ok(row);
        }

        let row = self
            .data
            .read()
            .await
            .row(id)
            .map(|r| r.as_ref().clone())
            .ok_or_else(|| AppError::not_found(format!("Task row with ID {} not found", id)))?;
        self.cache.set(&key, &row).await;
        Ok(row)
    }

    /// Replaces one cell's value and returns the updated row.
    ///
    /// Users in the value are validated. The row and table cache entries are
    /// invalidated.
    pub async fn update_cell(
        &self,
        row_id: &str,
        column_id: &str,
        value: CellValue,
    ) -> Result<Row, AppError> {
        check_users(&value)?;

        let row = {
            let mut data = self.data.write().await;

            if data.row(row_id).is_none() {
                return Err(AppError::not_found(format!(
                    "Task row with ID {} not found",
                    row_id
                )));
            }
            if data.column(column_id).is_none() {
                return Err(AppError::not_found(format!(
                    "Column with ID {} not found",
                    column_id
                )));
            }
            if data.row(row_id).and_then(|r| r.cell(column_id)).is_none() {
                return Err(AppError::not_found(format!(
                    "Cell with column ID {} not found in row {}",
                    column_id, row_id
                )));
            }

            data.update_cell_value(row_id, column_id, value)
                .map_err(|e| match e {
                    GridError::ValueMismatch { .. } => {
                        AppError::validation("Invalid cell value", "value", e.to_string())
                    }
                    other => AppError::internal(other.to_string()),
                })?;

            data.row(row_id)
                .map(|r| r.as_ref().clone())
                .ok_or_else(|| AppError::internal("row vanished during update"))?
        };

        self.cache.remove(&row_key(row_id)).await;
        self.cache.remove(ALL_KEY).await;
        log::info!("updated cell {} in row {}", column_id, row_id);
        Ok(row)
    }
}

fn check_users(value: &CellValue) -> Result<(), AppError> {
    let users = match value {
        CellValue::User(user) => std::slice::from_ref(user),
        CellValue::Users(users) => users.as_slice(),
        _ => return Ok(()),
    };

    let mut errors = std::collections::BTreeMap::new();
    for (i, user) in users.iter().enumerate() {
        for (field, message) in validate_user(user) {
            errors.insert(format!("value[{}].{}", i, field), message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation {
            message: "Invalid request data".to_string(),
            errors,
        })
    }
}
