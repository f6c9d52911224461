pub mod clock;
pub mod list;
pub mod model;

pub use clock::{Clock, SystemClock};
pub use list::ReminderList;
pub use model::{Reminder, ReminderId, Status};
