use crate::error::AppError;
use crate::model::Task;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const APP_NAME: &str = "secretary";
const DISABLE_ENV_VAR: &str = "SECRETARY_DISABLE_NOTIFICATIONS";
const ACTION_PREFIX: &str = "show:";

/// Delivers a due-soon reminder. Detection happens elsewhere; this only shows it.
pub trait Notifier {
    fn notify(&self, task: &Task) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _task: &Task) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn notifier_from_env() -> Result<Box<dyn Notifier>, AppError> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(AppError::InvalidData(reason)) => {
            tracing::info!(%reason, "desktop notifications unavailable, using no-op notifier");
            Ok(Box::new(NoopNotifier))
        }
        Err(other) => Err(other),
    }
}

pub fn reminder_text(task: &Task) -> String {
    format!("Due soon: {} ({})", task.title, task.due_date)
}

pub fn activation_argument(task_id: &str) -> String {
    format!("{ACTION_PREFIX}{task_id}")
}

pub fn parse_activation_argument(argument: &str) -> Option<String> {
    argument
        .strip_prefix(ACTION_PREFIX)
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}

/// Re-launches the current binary as `show <id>` when a reminder is clicked.
pub fn launch_show(task_id: &str) -> Result<(), AppError> {
    let exe = std::env::current_exe().map_err(|err| AppError::io(err.to_string()))?;
    std::process::Command::new(exe)
        .arg("show")
        .arg(task_id)
        .spawn()
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(())
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::{activation_argument, parse_activation_argument, reminder_text};
    use crate::model::{Priority, Task};

    #[test]
    fn activation_argument_round_trip() {
        let argument = activation_argument("task-1");
        assert_eq!(parse_activation_argument(&argument).as_deref(), Some("task-1"));
    }

    #[test]
    fn parse_activation_argument_rejects_other_values() {
        assert!(parse_activation_argument("other:task-1").is_none());
        assert!(parse_activation_argument("show:").is_none());
    }

    #[test]
    fn reminder_text_names_task_and_due_date() {
        let task = Task {
            id: "task-1".to_string(),
            owner_id: "local".to_string(),
            title: "Weekly Sync".to_string(),
            description: None,
            priority: Priority::Medium,
            due_date: "2024-02-26".to_string(),
            location: None,
            completed: false,
            expired: false,
            created_at: "2024-02-01T00:00:00Z".to_string(),
        };

        assert_eq!(reminder_text(&task), "Due soon: Weekly Sync (2024-02-26)");
    }
}
