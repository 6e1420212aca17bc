use super::{APP_NAME, activation_argument, launch_show, parse_activation_argument, reminder_text};
use crate::error::AppError;
use crate::model::Task;
use crate::notify::Notifier;
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        let task_id = task.id.clone();
        let action = activation_argument(&task.id);

        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_NAME)
            .text1(&reminder_text(task))
            .add_button("Open", &action)
            .on_activated(move |args| {
                let target = args
                    .as_deref()
                    .and_then(parse_activation_argument)
                    .unwrap_or_else(|| task_id.clone());
                let _ = launch_show(&target);
                Ok(())
            })
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
