//! Seed data served by the API

use taskgrid_lib::error::GridError;
use taskgrid_lib::model::Cell;
use taskgrid_lib::model::CellType;
use taskgrid_lib::model::Column;
use taskgrid_lib::model::GridData;
use taskgrid_lib::model::Row;
use taskgrid_lib::model::User;

const USERS: [(&str, &str, &str); 8] = [
    ("1", "Kenny Williams", "kenny"),
    ("2", "Gabriel Lima", "gabriel"),
    ("3", "Srinivas Gorur Shandilya", "srinivas"),
    ("4", "Akash Guru", "akash"),
    ("5", "Aram Davtyan", "aram"),
    ("6", "Bilal Shaikh", "bilal"),
    ("7", "Dilpreet Singh", "dilpreet"),
    ("8", "Elin Barnes", "elin"),
];

const TASKS: [(&str, &str, &str, &[&str]); 5] = [
    ("ID-1", "400 pix for mura", "todo", &["1"]),
    ("ID-2", "Select option ordering", "todo", &["2"]),
    ("ID-3", "Database filter bug v2", "in-progress", &["1", "2"]),
    ("ID-4", "Colored labels for select", "todo", &["3"]),
    ("ID-5", "Default values for select columns", "todo", &["4"]),
];

/// The eight directory users.
pub fn users() -> Vec<User> {
    USERS
        .iter()
        .map(|(id, name, handle)| {
            User::new(*id, *name)
                .with_email(format!("{}@example.com", handle))
                .with_avatar(format!("https://i.pravatar.cc/150?img={}", id))
        })
        .collect()
}

/// The task table. Assignees are copied from `users`; unknown ids are skipped.
pub fn tasks(users: &[User]) -> Result<GridData, GridError> {
    let columns = vec![
        Column::new("id", "ID", CellType::Text).width("80px"),
        Column::new("summary", "Summary", CellType::Text)
            .width("300px")
            .editable(true),
        Column::new("status", "Status", CellType::Tag)
            .width("120px")
            .editable(true),
        Column::new("assignee", "Assignee", CellType::MultiUser)
            .width("200px")
            .editable(true),
    ];

    let rows = TASKS
        .iter()
        .map(|(id, summary, status, assignees)| {
            let assignees = assignees
                .iter()
                .filter_map(|uid| {
                    let user = users.iter().find(|u| u.id == *uid).cloned();
                    if user.is_none() {
                        log::error!("seed task {} references unknown user {}", id, uid);
                    }
                    user
                })
                .collect();

            Row::new(*id)
                .with_cell("id", Cell::text(*id))
                .with_cell("summary", Cell::text(*summary).editable(true))
                .with_cell("status", Cell::tag(*status).editable(true))
                .with_cell("assignee", Cell::multi_user(assignees).editable(true))
        })
        .collect();

    GridData::try_new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_consistent() {
        let users = users();
        assert_eq!(users.len(), 8);
        assert_eq!(users[7].email.as_deref(), Some("elin@example.com"));

        let grid = tasks(&users).unwrap();
        assert_eq!(grid.columns().len(), 4);
        assert_eq!(grid.rows().len(), 5);
        assert!(grid.type_mismatches().is_empty());

        let assignees = grid.row("ID-3").unwrap().cell("assignee").unwrap();
        assert_eq!(assignees.as_users().map(|u| u.len()), Some(2));
    }
}
