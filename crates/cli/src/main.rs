// castgrid CLI - preview, cast and browse tabular files through the ingestion backend

mod exit_codes;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use castgrid_client::{ClientError, IngestClient};
use castgrid_config::Settings;
use castgrid_core::{QueryState, Session, Settlement, SortSpec, UploadStatus};
use castgrid_plan::{Assignment, CastPlan, CastType, PlanError};
use castgrid_reader::{CellGrid, FileKind, PreviewWindow, ReadError};

use exit_codes::{
    client_exit_code, read_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE,
};

/// Log filter override (tracing `EnvFilter` syntax).
const LOG_ENV: &str = "CASTGRID_LOG";

#[derive(Parser)]
#[command(name = "castgrid")]
#[command(about = "Preview a tabular file, declare column casts, ingest it and browse the result")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides CASTGRID_API_URL and settings.json)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Settings file to use instead of the per-user one
    #[arg(long, global = true, value_name = "PATH", env = "CASTGRID_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the first rows of a file as they will be uploaded
    #[command(after_help = "\
Examples:
  castgrid preview sales.csv
  castgrid preview report.xlsx --rows 20")]
    Preview {
        file: PathBuf,

        /// Data rows to show (minimum 5)
        #[arg(long)]
        rows: Option<usize>,
    },

    /// List cast types and their options
    Types,

    /// Build a cast plan for a file and print its directives
    #[command(after_help = "\
Examples:
  castgrid plan sales.csv --cast qty=uint:uint16 --cast when=datetime:%d/%m/%Y
  castgrid plan sales.csv --cast price=float -o plan.json")]
    Plan {
        file: PathBuf,

        /// Column cast, COLUMN=TYPE[:OPTION]. Repeatable.
        #[arg(long, value_name = "ASSIGNMENT")]
        cast: Vec<String>,

        /// Start from a saved plan
        #[arg(long, value_name = "PATH")]
        plan: Option<PathBuf>,

        /// Save the plan as JSON instead of printing directives
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Submit a file and its cast plan for ingestion
    #[command(after_help = "\
Examples:
  castgrid upload sales.csv --cast qty=int:int32
  castgrid upload sales.csv --plan plan.json --view")]
    Upload {
        file: PathBuf,

        /// Saved plan to apply
        #[arg(long, value_name = "PATH")]
        plan: Option<PathBuf>,

        /// Column cast, COLUMN=TYPE[:OPTION]. Repeatable; applied after --plan.
        #[arg(long, value_name = "ASSIGNMENT")]
        cast: Vec<String>,

        /// Fetch and print the first page after a successful upload
        #[arg(long)]
        view: bool,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Show one page of an ingested file
    #[command(after_help = "\
Examples:
  castgrid view sales.csv
  castgrid view sales.csv --page 3 --page-size 50 --sort price --desc")]
    View {
        /// File id returned by `upload`
        file_id: String,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        page: u64,

        /// Rows per page (defaults to table.pageSize)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        page_size: Option<u64>,

        /// Sort by this column
        #[arg(long, value_name = "COLUMN")]
        sort: Option<String>,

        /// Sort descending (requires --sort)
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    init_tracing(&settings.log_level);

    let api_url = cli.api_url.as_deref();
    let result = match cli.command {
        Commands::Preview { file, rows } => cmd_preview(&file, rows.unwrap_or(settings.preview_rows)),
        Commands::Types => cmd_types(),
        Commands::Plan { file, cast, plan, output } => cmd_plan(&file, &cast, plan.as_deref(), output.as_deref()),
        Commands::Upload { file, plan, cast, view, json } => {
            cmd_upload(&settings, api_url, &file, plan.as_deref(), &cast, view, json)
        }
        Commands::View { file_id, page, page_size, sort, desc, json } => {
            let query = QueryState {
                page: page - 1,
                page_size: page_size.unwrap_or(settings.page_size),
                sort: sort.map(|field| SortSpec { field, ascending: !desc }),
            };
            cmd_view(&settings, api_url, file_id, query, json)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Stderr subscriber. `CASTGRID_LOG` wins over `log.level`.
fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // Fails only if a subscriber is already installed
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .ok();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn read(err: ReadError) -> Self {
        let hint = match &err {
            ReadError::UnsupportedFormat(_) => Some("supported files: .csv, .xlsx".to_string()),
            _ => None,
        };
        Self { code: read_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn plan(err: PlanError) -> Self {
        let hint = match &err {
            PlanError::UnknownType(_) => Some("run `castgrid types` for the list".to_string()),
            _ => None,
        };
        Self { code: EXIT_USAGE, message: err.to_string(), hint }
    }

    /// Backend failure behind a fixed outcome message.
    pub fn backend(message: &str, err: Option<&ClientError>) -> Self {
        Self {
            code: err.map(client_exit_code).unwrap_or(EXIT_ERROR),
            message: message.to_string(),
            hint: err.map(|e| e.to_string()),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn write_out(text: &str) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .map_err(|e| CliError::io(e.to_string()))
}

fn read_grid(file: &Path) -> Result<CellGrid, CliError> {
    castgrid_reader::read_file(file).map_err(CliError::read)
}

fn client(settings: &Settings, api_url: Option<&str>) -> Result<IngestClient, CliError> {
    let base = settings
        .api_base(api_url)
        .map_err(|e| CliError::args(e.to_string()).with_hint("pass --api-url or set CASTGRID_API_URL"))?;
    tracing::debug!(api_base = %base, "using backend");
    Ok(IngestClient::new(base))
}

// ============================================================================
// preview
// ============================================================================

fn cmd_preview(file: &Path, rows: usize) -> Result<(), CliError> {
    let grid = read_grid(file)?;
    let mut window = PreviewWindow::new(&grid);
    window.resize(rows);

    let header = castgrid_reader::headers(&grid).to_vec();
    let mut out = render::aligned(&header, window.rows(&grid));
    out.push_str(&window.label());
    out.push('\n');
    write_out(&out)
}

// ============================================================================
// types
// ============================================================================

fn cmd_types() -> Result<(), CliError> {
    let rows: Vec<Vec<String>> = CastType::ALL
        .iter()
        .map(|t| {
            let options = match t {
                CastType::Datetime => "<strftime format>".to_string(),
                _ => t
                    .width_options()
                    .iter()
                    .map(|(tag, _)| *tag)
                    .collect::<Vec<_>>()
                    .join(", "),
            };
            vec![t.tag().to_string(), t.label().to_string(), options]
        })
        .collect();
    let header = ["type", "label", "options"].map(String::from);
    write_out(&render::aligned(&header, &rows))
}

// ============================================================================
// plan
// ============================================================================

/// Overlay a saved plan and then `--cast` assignments onto `plan`.
fn edit_plan(plan: &mut CastPlan, saved: Option<&Path>, casts: &[String]) -> Result<(), CliError> {
    if let Some(path) = saved {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
        let saved = CastPlan::from_json(&json).map_err(CliError::plan)?;
        for column in plan.merge(&saved) {
            eprintln!("note: column '{}' from {} is not in this file; ignored", column, path.display());
        }
    }
    for cast in casts {
        let assignment: Assignment = cast.parse().map_err(CliError::plan)?;
        plan.apply(&assignment).map_err(CliError::plan)?;
    }
    Ok(())
}

fn cmd_plan(file: &Path, casts: &[String], saved: Option<&Path>, output: Option<&Path>) -> Result<(), CliError> {
    let grid = read_grid(file)?;
    let mut plan = CastPlan::new(castgrid_reader::headers(&grid).to_vec());
    edit_plan(&mut plan, saved, casts)?;

    if let Some(path) = output {
        let json = plan.to_json().map_err(CliError::plan)?;
        std::fs::write(path, json).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
        eprintln!("Saved plan for {} columns to {}", plan.len(), path.display());
        return Ok(());
    }

    let directives = plan.directives();
    if directives.is_empty() {
        eprintln!("No directives: every column keeps its inferred type");
        return Ok(());
    }
    let mut out = String::new();
    for d in directives {
        out.push_str(&format!("{} = {}\n", d.field_name(), d.value));
    }
    write_out(&out)
}

// ============================================================================
// upload
// ============================================================================

fn cmd_upload(
    settings: &Settings,
    api_url: Option<&str>,
    file: &Path,
    saved: Option<&Path>,
    casts: &[String],
    view: bool,
    json: bool,
) -> Result<(), CliError> {
    // Surface the precise reason here; the coordinator only logs it
    FileKind::from_path(file).map_err(CliError::read)?;
    let client = client(settings, api_url)?;

    let mut session = Session::new(QueryState {
        page_size: settings.page_size,
        ..QueryState::default()
    });
    if !session.select_file(file) {
        return Err(CliError::io(format!("cannot read {}", file.display())));
    }
    if let Some(plan) = session.upload_mut().plan_mut() {
        edit_plan(plan, saved, casts)?;
    }

    let ticket = session.submit(&client);
    let notice = session.notification().clone();
    match session.upload().status() {
        UploadStatus::Success => {}
        UploadStatus::Error => {
            return Err(CliError::backend(&notice.message, session.upload().last_failure()));
        }
        _ => return Err(CliError::io(format!("cannot read {}", file.display()))),
    }

    let file_id = session.upload().file_id().unwrap_or_default().to_string();
    let cast_errors = session.upload().cast_errors();

    let settlement = if view { session.run(&client, ticket) } else { None };
    let page = session.table().page().cloned();

    if json {
        let mut doc = serde_json::json!({
            "file_id": file_id,
            "errors": cast_errors,
        });
        if let Some(page) = &page {
            doc["page"] = serde_json::to_value(page).map_err(|e| CliError::io(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(&doc).map_err(|e| CliError::io(e.to_string()))?;
        write_out(&format!("{}\n", text))?;
    } else {
        eprintln!("{}", notice.message);
        let mut out = format!("file_id: {}\n", file_id);
        for failure in &cast_errors {
            out.push_str(&format!("{}\n", failure));
        }
        if let Some(page) = &page {
            out.push('\n');
            out.push_str(&render::page_table(page));
            out.push_str(&render::page_footer(page));
            out.push('\n');
        }
        write_out(&out)?;
    }

    if settlement == Some(Settlement::Failed) {
        let message = session.notification().message.clone();
        return Err(CliError::backend(&message, session.table().last_failure()));
    }
    Ok(())
}

// ============================================================================
// view
// ============================================================================

fn cmd_view(
    settings: &Settings,
    api_url: Option<&str>,
    file_id: String,
    mut query: QueryState,
    json: bool,
) -> Result<(), CliError> {
    let client = client(settings, api_url)?;

    // Pointing at a file resets the sort, so it is applied afterwards and
    // supersedes the first ticket
    let sort = query.sort.take();
    let mut session = Session::new(query);
    let mut ticket = session.table_mut().set_file_id(file_id);
    if sort.is_some() {
        ticket = session.table_mut().set_sort(sort).or(ticket);
    }
    if session.run(&client, ticket) != Some(Settlement::Applied) {
        let message = session.notification().message.clone();
        return Err(CliError::backend(&message, session.table().last_failure()));
    }

    let Some(page) = session.table().page() else {
        return Err(CliError::backend("no page to show", None));
    };

    if json {
        let text = serde_json::to_string_pretty(page).map_err(|e| CliError::io(e.to_string()))?;
        write_out(&format!("{}\n", text))
    } else {
        let mut out = render::page_table(page);
        out.push_str(&render::page_footer(page));
        out.push('\n');
        write_out(&out)
    }
}
