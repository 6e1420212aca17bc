use clap::{Parser, Subcommand, ValueEnum};
use secretary_core::config::{ConfigOverrides, canonical_key};
use secretary_core::engine::{NotifiedPolicy, SortKey};
use secretary_core::model::Priority;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personal tasks, notes and calendar", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Act on behalf of this owner instead of the configured one
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: secretary add "Review proposal" --due 2024-02-20 -p high
    Add {
        title: String,
        #[arg(long, value_name = "DATE")]
        due: String,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },
    /// Edit a task; omitted fields keep their current value
    ///
    /// Example: secretary edit task-1 --due "2024-02-22 14:00"
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Remove the stored location
        #[arg(long, conflicts_with_all = ["lat", "lng"])]
        clear_location: bool,
    },
    /// Mark a task completed, or reopen a completed one
    ///
    /// Example: secretary toggle task-1
    Toggle { id: String },
    /// Delete a task
    ///
    /// Example: secretary delete task-1
    Delete { id: String },
    /// Show details of a task
    ///
    /// Example: secretary show task-1
    Show { id: String },
    /// List tasks in one view
    ///
    /// Example: secretary list
    /// Example: secretary list expired --sort priority
    /// Example: secretary list all --search meeting --date 2024-02-20
    List {
        #[arg(value_enum, default_value_t = ListView::Active)]
        view: ListView,
        #[arg(long, value_enum, default_value_t = SortArg::Due)]
        sort: SortArg,
        #[arg(long)]
        search: Option<String>,
        /// Only tasks due on this day
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// Pending tasks due today
    ///
    /// Example: secretary today
    Today,
    /// Completed and expired tasks
    ///
    /// Example: secretary history
    History,
    /// Completion rate, priority distribution and monthly breakdown
    ///
    /// Example: secretary stats --months 3
    Stats {
        #[arg(long)]
        months: Option<u32>,
    },
    /// Send reminders for tasks due soon
    ///
    /// Example: secretary notify --horizon 2
    Notify {
        #[arg(long)]
        horizon: Option<u32>,
    },
    /// Show a month with its tasks and holidays
    ///
    /// Example: secretary calendar --month 2024-02
    Calendar {
        #[arg(long, value_name = "YYYY-MM")]
        month: Option<String>,
    },
    /// Quick notes
    Note {
        #[command(subcommand)]
        note: NoteCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// Example: secretary note add "call the plumber"
    Add { content: String },
    /// Example: secretary note list
    List,
    /// Example: secretary note edit note-1 "call the plumber at 5"
    Edit { id: String, content: String },
    /// Example: secretary note delete note-1
    Delete { id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListView {
    Active,
    Completed,
    Expired,
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortArg {
    Due,
    Priority,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Due => SortKey::DueDate,
            SortArg::Priority => SortKey::Priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Owner,
    HorizonDays,
    MonthsBack,
    NotifiedPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field = canonical_key(key_raw);
    if field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "owner" => ConfigOverrideTarget::Owner,
        "horizon_days" | "horizon" => ConfigOverrideTarget::HorizonDays,
        "months_back" | "months" => ConfigOverrideTarget::MonthsBack,
        "notified_policy" => ConfigOverrideTarget::NotifiedPolicy,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` into one set; later values win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Owner => overrides.owner = Some(parsed.value),
            ConfigOverrideTarget::HorizonDays => {
                overrides.horizon_days = Some(parse_count("horizon_days", &parsed.value)?)
            }
            ConfigOverrideTarget::MonthsBack => {
                overrides.months_back = Some(parse_count("months_back", &parsed.value)?)
            }
            ConfigOverrideTarget::NotifiedPolicy => {
                overrides.notified_policy = Some(parse_policy(&parsed.value)?)
            }
        }
    }
    Ok(overrides)
}

fn parse_count(field: &str, value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("{field} must be a non-negative number"))
}

fn parse_policy(value: &str) -> Result<NotifiedPolicy, String> {
    match canonical_key(value).as_str() {
        "keep" => Ok(NotifiedPolicy::Keep),
        "reset" | "reset_when_not_due" => Ok(NotifiedPolicy::ResetWhenNotDue),
        other => Err(format!("unknown notified_policy '{other}'")),
    }
}
