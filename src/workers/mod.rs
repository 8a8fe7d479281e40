pub mod due_date_reminder;

pub use due_date_reminder::{due_date_reminder_worker, run_due_date_sweep};
