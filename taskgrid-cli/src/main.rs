mod paths;
mod table;

use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;
use taskgrid_lib::DEFAULT_BASE_URL;
use taskgrid_lib::DataGrid;
use taskgrid_lib::FetchState;
use taskgrid_lib::PluginRegistry;
use taskgrid_lib::TaskGridClient;
use taskgrid_lib::edit::EditInput;
use taskgrid_lib::edit::EditOutcome;
use taskgrid_lib::error::ApiError;
use taskgrid_lib::error::GridError;
use taskgrid_lib::fetch::TASKS_LOAD_FAILED;
use taskgrid_lib::grid::ClickResult;
use taskgrid_lib::grid::ClickTarget;
use taskgrid_lib::model::CellValue;

#[derive(Parser)]
#[command(name = "taskgrid")]
#[command(version)]
#[command(about = "Browse and edit the task grid", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, env = "TASKGRID_URL", default_value = DEFAULT_BASE_URL, global = true)]
    url: String,

    /// Print without colors
    #[arg(long, global = true)]
    plain: bool,

    /// Level written to the log file
    #[arg(long, default_value_t = LevelFilter::Info, global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the task table (default)
    List {
        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Edit a text, date, tag or link-label cell
    Set {
        row: String,
        column: String,
        value: String,
    },

    /// Add users to a multi-user cell, taking the first match of each query
    Assign {
        row: String,
        column: String,

        #[arg(required = true)]
        queries: Vec<String>,

        /// Drop the current users first
        #[arg(long)]
        replace: bool,
    },

    /// Search the user directory
    Users { query: Option<String> },

    /// Show one user
    User { id: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Load(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("no cell {column} in row {row}")]
    UnknownCell { row: String, column: String },

    #[error("cell {column} in row {row} is not editable")]
    NotEditable { row: String, column: String },

    #[error("no user matches {0:?}")]
    NoMatch(String),
}

fn init_logging(level: LevelFilter) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, Config::default(), file);
        }
        Err(e) => eprintln!("cannot open log file {}: {}", path.display(), e),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let client = Arc::new(TaskGridClient::new(&cli.url)?);
    let styled = !cli.plain;
    log::info!("using API at {}", client.base_url());

    match cli.command.unwrap_or(Command::List {
        sort: None,
        desc: false,
    }) {
        Command::List { sort, desc } => {
            let mut grid = load_grid(&client).await?;
            if let Some(column) = sort {
                grid.sort_by_column(&column);
                if desc {
                    grid.sort_by_column(&column);
                }
            }
            print!("{}", table::render(&grid, styled));
        }
        Command::Set { row, column, value } => {
            let mut grid = load_grid(&client).await?;
            set_text(&mut grid, &row, &column, value)?;
            push_updates(&client, &mut grid).await?;
            print!("{}", table::render(&grid, styled));
        }
        Command::Assign {
            row,
            column,
            queries,
            replace,
        } => {
            let mut grid = load_grid(&client).await?;
            start_edit(&mut grid, &row, &column)?;

            if replace {
                let current: Vec<String> = grid
                    .data()
                    .row(&row)
                    .and_then(|r| r.cell(&column))
                    .and_then(|c| c.as_users())
                    .map(|users| users.iter().map(|u| u.id.clone()).collect())
                    .unwrap_or_default();
                for id in current {
                    grid.handle_input(EditInput::Remove(id))?;
                }
            }
            for query in queries {
                let user = client
                    .fetch_users(&query)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| CliError::NoMatch(query.clone()))?;
                grid.handle_input(EditInput::Select(user))?;
            }

            commit(&mut grid, EditInput::Blur, &row, &column)?;
            push_updates(&client, &mut grid).await?;
            print!("{}", table::render(&grid, styled));
        }
        Command::Users { query } => {
            let users = client.fetch_users(query.as_deref().unwrap_or("")).await?;
            print!("{}", table::render_users(&users));
        }
        Command::User { id } => {
            let user = client.fetch_user(&id).await?;
            print!("{}", table::render_users(std::slice::from_ref(&user)));
        }
    }
    Ok(())
}

async fn load_grid(client: &Arc<TaskGridClient>) -> Result<DataGrid, CliError> {
    match FetchState::from_result(client.fetch_tasks().await, TASKS_LOAD_FAILED) {
        FetchState::Loaded(data) => Ok(DataGrid::new(
            data,
            PluginRegistry::with_defaults(client.clone()),
        )),
        FetchState::Failed(message) => Err(CliError::Load(message)),
        FetchState::Loading => Err(CliError::Load(TASKS_LOAD_FAILED.to_string())),
    }
}

fn start_edit(grid: &mut DataGrid, row: &str, column: &str) -> Result<(), CliError> {
    match grid.click(row, column, ClickTarget::Cell) {
        ClickResult::Editing => Ok(()),
        ClickResult::Ignored => Err(CliError::UnknownCell {
            row: row.to_string(),
            column: column.to_string(),
        }),
        _ => Err(CliError::NotEditable {
            row: row.to_string(),
            column: column.to_string(),
        }),
    }
}

/// Writes `value` into a string cell.
///
/// Cells with a registered editor go through an edit session. Editable
/// cells without one, such as tags, are written directly.
fn set_text(grid: &mut DataGrid, row: &str, column: &str, value: String) -> Result<(), CliError> {
    match grid.click(row, column, ClickTarget::Cell) {
        ClickResult::Editing => {
            grid.handle_input(EditInput::SetText(value))?;
            commit(grid, EditInput::Enter, row, column)
        }
        ClickResult::Selected if writable_without_editor(grid, row, column) => {
            grid.update_cell_value(row, column, CellValue::Text(value))?;
            Ok(())
        }
        ClickResult::Ignored => Err(CliError::UnknownCell {
            row: row.to_string(),
            column: column.to_string(),
        }),
        _ => Err(CliError::NotEditable {
            row: row.to_string(),
            column: column.to_string(),
        }),
    }
}

fn writable_without_editor(grid: &DataGrid, row: &str, column: &str) -> bool {
    let data = grid.data();
    let Some(column) = data.column(column) else {
        return false;
    };
    grid.registry().editor(column.cell_type).is_none()
        && column.editable
        && data
            .row(row)
            .and_then(|r| r.cell(&column.id))
            .is_some_and(|cell| cell.is_editable() && cell.cell_type() == column.cell_type)
}

/// Sends the closing input. Anything but a save means the cell rejected the edit.
fn commit(grid: &mut DataGrid, input: EditInput, row: &str, column: &str) -> Result<(), CliError> {
    match grid.handle_input(input)? {
        Some(EditOutcome::Save(_)) => Ok(()),
        _ => {
            grid.clear_selection();
            Err(CliError::NotEditable {
                row: row.to_string(),
                column: column.to_string(),
            })
        }
    }
}

async fn push_updates(client: &TaskGridClient, grid: &mut DataGrid) -> Result<(), CliError> {
    for update in grid.drain_updates() {
        log::info!("saving {}/{}", update.row_id, update.column_id);
        let row = client
            .update_cell(&update.row_id, &update.column_id, update.value)
            .await?;
        grid.replace_row(row);
    }
    Ok(())
}
