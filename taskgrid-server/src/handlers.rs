//! Route handlers
//!
//! Each handler returns the success payload; the router wraps it in the
//! envelope and turns errors into error responses.

use taskgrid_lib::model::CellValue;
use taskgrid_lib::model::GridData;
use taskgrid_lib::response::RowPayload;
use taskgrid_lib::response::UserPayload;
use taskgrid_lib::response::UsersPayload;

use crate::error::AppError;
use crate::services::SEARCH_LIMIT;
use crate::state::AppState;
use crate::validation::is_valid_search_query;

/// `GET /tasks`
pub async fn get_tasks(state: &AppState) -> GridData {
    log::info!("getting all tasks");
    state.tasks.all().await
}

/// `GET /tasks/:id`
pub async fn get_task_row(state: &AppState, id: &str) -> Result<RowPayload, AppError> {
    if id.is_empty() {
        return Err(AppError::validation(
            "Task row ID is required",
            "id",
            "Task row ID is required",
        ));
    }
    log::info!("getting task row {}", id);
    let row = state.tasks.row(id).await?;
    Ok(RowPayload { row })
}

/// `PATCH /tasks/:rowId/cells/:columnId` with body `{"value": ...}`
pub async fn update_cell(
    state: &AppState,
    row_id: &str,
    column_id: &str,
    body: &[u8],
) -> Result<RowPayload, AppError> {
    let value = parse_cell_value(body)?;
    log::info!("updating cell in row {}, column {}", row_id, column_id);
    let row = state.tasks.update_cell(row_id, column_id, value).await?;
    Ok(RowPayload { row })
}

/// `GET /users[?query=]`
pub async fn get_users(state: &AppState, query: Option<&str>) -> Result<UsersPayload, AppError> {
    if let Some(query) = query
        && !is_valid_search_query(query)
    {
        return Err(AppError::validation(
            "Invalid search query",
            "query",
            "Search query contains invalid characters or is too long",
        ));
    }

    let query = query.unwrap_or_default();
    if query.is_empty() {
        log::info!("getting all users");
    } else {
        log::info!("searching users with query: {}", query);
    }
    let users = state.users.search(query, SEARCH_LIMIT).await;
    Ok(UsersPayload { users })
}

/// `GET /users/:id`
pub async fn get_user(state: &AppState, id: &str) -> Result<UserPayload, AppError> {
    log::info!("getting user {}", id);
    let user = state.users.get(id).await?;
    Ok(UserPayload { user })
}

fn parse_cell_value(body: &[u8]) -> Result<CellValue, AppError> {
    let missing = || AppError::validation("Cell value is required", "value", "Cell value is required");

    if body.is_empty() {
        return Err(missing());
    }
    let json: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::validation("Invalid JSON body", "body", e.to_string()))?;
    let value = match json {
        serde_json::Value::Object(mut map) => map.remove("value").ok_or_else(missing)?,
        _ => return Err(missing()),
    };

    serde_json::from_value(value).map_err(|_| {
        AppError::validation(
            "Invalid request data",
            "value",
            "Value must be a number, a string, a user or a list of users",
        )
    })
}
