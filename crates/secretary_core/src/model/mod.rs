mod due;
mod note;
mod task;

pub use due::DueDate;
pub use note::Note;
pub use task::{Location, Priority, Task, TaskFields, TaskStatus};
