use super::{APP_NAME, activation_argument, launch_show, reminder_text};
use crate::error::AppError;
use crate::model::Task;
use crate::notify::Notifier;
use notify_rust::Notification;

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        let action = activation_argument(&task.id);
        let handle = Notification::new()
            .appname(APP_NAME)
            .summary(APP_NAME)
            .body(&reminder_text(task))
            .action(&action, "Open")
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        let task_id = task.id.clone();
        std::thread::spawn(move || {
            handle.wait_for_action(|selected| {
                if selected == action || selected == "default" {
                    if let Err(err) = launch_show(&task_id) {
                        tracing::warn!(%task_id, %err, "failed to open task from notification");
                    }
                }
            });
        });

        Ok(())
    }
}
