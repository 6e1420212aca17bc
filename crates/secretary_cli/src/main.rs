use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use secretary_cli::cli::{Cli, Command, ListView, NoteCommand, collect_overrides};
use secretary_cli::render;
use secretary_core::config::{self, Config, Palette, merge_overrides, palette_for_theme};
use secretary_core::engine;
use secretary_core::error::{AppError, DateIssue};
use secretary_core::model::{DueDate, Location, Note, Task, TaskFields};
use secretary_core::notify;
use secretary_core::task_api::{self, JsonStore, NoteStore, TaskStore};
use std::io::{self, BufRead};
use time::{Month, OffsetDateTime};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "SECRETARY_LOG";

struct Session {
    store: JsonStore,
    config: Config,
    palette: Palette,
    now: OffsetDateTime,
    json: bool,
}

impl Session {
    fn open(cli: &Cli, base: &Config) -> Result<Self, AppError> {
        let mut overrides =
            collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
        if cli.owner.is_some() {
            overrides.owner = cli.owner.clone();
        }
        let config = merge_overrides(base, &overrides);
        Ok(Self {
            store: JsonStore::open()?,
            palette: palette_for_theme(config.theme.as_deref()),
            config,
            now: task_api::local_now(),
            json: cli.json,
        })
    }

    fn owner(&self) -> &str {
        self.config.owner()
    }

    /// Tasks of other owners are reported as missing.
    fn owned_task(&self, id: &str) -> Result<Task, AppError> {
        let task = self.store.get_task(id)?;
        if task.owner_id != self.owner() {
            return Err(AppError::not_found(format!("task {id} not found")));
        }
        Ok(task)
    }

    fn print_task(&self, verb: &str, task: &Task) {
        if self.json {
            println!("{}", render::task_json(task, self.now));
        } else {
            println!("{verb} task: {} ({})", task.title, task.id);
        }
    }

    fn print_tasks(&self, tasks: &[Task], empty: &str) {
        if self.json {
            println!("{}", render::tasks_json(tasks, self.now));
        } else if tasks.is_empty() {
            println!("{}", self.palette.mutedize(empty));
        } else {
            println!("{}", render::task_table(tasks, self.now));
        }
    }
}

fn report_issues(issues: &[DateIssue]) {
    for issue in issues {
        eprintln!("WARNING: {}", issue.error);
    }
}

fn location(lat: Option<f64>, lng: Option<f64>) -> Option<Location> {
    lat.zip(lng).map(|(lat, lng)| Location { lat, lng })
}

fn parse_month(raw: &str) -> Result<(i32, Month), AppError> {
    let invalid = || AppError::invalid_input(format!("month must be YYYY-MM, got '{raw}'"));
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month
        .parse::<u8>()
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .ok_or_else(invalid)?;
    Ok((year, month))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli: Cli, base: &Config) -> Result<(), AppError> {
    let session = Session::open(&cli, base)?;
    let offset = session.now.offset();

    match cli.command {
        Command::Add {
            title,
            due,
            priority,
            description,
            lat,
            lng,
        } => {
            let fields = TaskFields {
                title,
                description,
                priority,
                due_date: due,
                location: location(lat, lng),
            };
            let task = session.store.create_task(session.owner(), fields)?;
            session.print_task("Added", &task);
        }
        Command::Edit {
            id,
            title,
            due,
            priority,
            description,
            lat,
            lng,
            clear_location,
        } => {
            let existing = session.owned_task(&id)?;
            let location = if clear_location {
                None
            } else {
                location(lat, lng).or(existing.location)
            };
            let fields = TaskFields {
                title: title.unwrap_or(existing.title),
                description: description.or(existing.description),
                priority: priority.unwrap_or(existing.priority),
                due_date: due.unwrap_or(existing.due_date),
                location,
            };
            let task = session.store.update_task(&id, fields)?;
            session.print_task("Updated", &task);
        }
        Command::Toggle { id } => {
            session.owned_task(&id)?;
            let task = session.store.toggle_completed(&id)?;
            let verb = if task.completed { "Completed" } else { "Reopened" };
            session.print_task(verb, &task);
        }
        Command::Delete { id } => {
            let task = session.owned_task(&id)?;
            session.store.delete_task(&id)?;
            session.print_task("Deleted", &task);
        }
        Command::Show { id } => {
            let task = session.owned_task(&id)?;
            if session.json {
                println!("{}", render::task_json(&task, session.now));
            } else {
                println!("{}", render::task_detail(&task, session.now, &session.palette));
            }
        }
        Command::List {
            view,
            sort,
            search,
            date,
        } => {
            let tasks = session.store.list_tasks(session.owner())?;
            let partition = engine::partition(&tasks, session.now);
            report_issues(&partition.issues);

            let mut selected = match view {
                ListView::Active => partition.active,
                ListView::Completed => partition.completed_history,
                ListView::Expired => partition.expired_history,
                ListView::All => tasks,
            };
            if let Some(raw) = date.as_deref() {
                let day = DueDate::parse(raw, offset)?.date_in(offset);
                selected = engine::date_filter(&selected, day, offset);
            }
            if let Some(query) = search.as_deref() {
                selected = engine::search(&selected, query);
            }
            let sorted = engine::sort_tasks(&selected, sort.into(), offset);
            session.print_tasks(&sorted, "No tasks");
        }
        Command::Today => {
            let tasks = session.store.list_tasks(session.owner())?;
            let today = engine::sort_by_due_date(&engine::due_today(&tasks, session.now), offset);
            session.print_tasks(&today, "Nothing due today");
        }
        Command::History => {
            let tasks = session.store.list_tasks(session.owner())?;
            let partition = engine::partition(&tasks, session.now);
            report_issues(&partition.issues);

            let completed = engine::sort_by_due_date(&partition.completed_history, offset);
            let expired = engine::sort_by_due_date(&partition.expired_history, offset);
            if session.json {
                let payload = serde_json::json!({
                    "completed": render::tasks_json(&completed, session.now),
                    "expired": render::tasks_json(&expired, session.now),
                });
                println!("{payload}");
            } else {
                println!("{}", session.palette.accentize("Completed"));
                session.print_tasks(&completed, "No completed tasks");
                println!("{}", session.palette.accentize("Expired"));
                session.print_tasks(&expired, "No expired tasks");
            }
        }
        Command::Stats { months } => {
            let tasks = session.store.list_tasks(session.owner())?;
            let stats = engine::aggregate(&tasks, session.now);
            report_issues(&stats.issues);
            let months = months.unwrap_or_else(|| session.config.months_back());
            let buckets = engine::monthly_buckets(&tasks, session.now, months);
            if session.json {
                println!("{}", render::stats_json(&stats, &buckets));
            } else {
                println!("{}", render::stats_text(&stats, &buckets, &session.palette));
            }
        }
        Command::Notify { horizon } => {
            let notifier = notify::notifier_from_env()?;
            let outcome = task_api::notify_due_soon(
                &session.store,
                notifier.as_ref(),
                session.owner(),
                session.now,
                horizon.unwrap_or_else(|| session.config.horizon_days()),
                session.config.notified_policy(),
            )?;
            report_issues(&outcome.issues);
            for failure in &outcome.failures {
                eprintln!(
                    "WARNING: notification for {} failed: {}",
                    failure.task_id, failure.error
                );
            }

            if session.json {
                println!("{}", render::tasks_json(&outcome.tasks, session.now));
            } else if outcome.tasks.is_empty() {
                println!("{}", session.palette.mutedize("No new reminders"));
            } else {
                for task in &outcome.tasks {
                    println!("Notified task: {} ({})", task.title, task.id);
                }
            }
        }
        Command::Calendar { month } => {
            let (year, month) = match month.as_deref() {
                Some(raw) => parse_month(raw)?,
                None => (session.now.year(), session.now.month()),
            };
            let tasks = session.store.list_tasks(session.owner())?;
            let days = engine::month_view(&tasks, year, month, offset)?;
            if session.json {
                println!("{}", render::calendar_json(&days));
            } else {
                println!(
                    "{}",
                    render::calendar_text(year, month, &days, &session.palette)
                );
            }
        }
        Command::Note { note } => run_note_command(&session, note)?,
    }

    Ok(())
}

fn run_note_command(session: &Session, command: NoteCommand) -> Result<(), AppError> {
    let (verb, note) = match command {
        NoteCommand::List => {
            let notes = session.store.list_notes(session.owner())?;
            if session.json {
                let payload: Vec<_> = notes.iter().map(render::note_json).collect();
                println!("{}", serde_json::Value::Array(payload));
            } else if notes.is_empty() {
                println!("{}", session.palette.mutedize("No notes"));
            } else {
                println!("{}", render::note_table(&notes));
            }
            return Ok(());
        }
        NoteCommand::Add { content } => (
            "Added",
            session.store.create_note(session.owner(), &content)?,
        ),
        NoteCommand::Edit { id, content } => {
            owned_note(session, &id)?;
            ("Updated", session.store.update_note(&id, &content)?)
        }
        NoteCommand::Delete { id } => {
            let note = owned_note(session, &id)?;
            session.store.delete_note(&id)?;
            ("Deleted", note)
        }
    };

    if session.json {
        println!("{}", render::note_json(&note));
    } else {
        println!("{verb} note: {}", note.id);
    }
    Ok(())
}

fn owned_note(session: &Session, id: &str) -> Result<Note, AppError> {
    session
        .store
        .list_notes(session.owner())?
        .into_iter()
        .find(|note| note.id == id)
        .ok_or_else(|| AppError::not_found(format!("note {id} not found")))
}

fn run_interactive(base: &Config) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("secretary".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, base) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_base_config() -> Config {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        tracing::warn!(%err, "using default configuration");
    }
    loaded.config
}

fn main() {
    init_logging();
    let base = load_base_config();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive(&base) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli, &base) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
