//! Release-day reminder service
//!
//! Once an hour, every movie releasing today whose owner has not been
//! reminded yet gets one email. Delivery is retried on later firings until it
//! succeeds; after that the movie is flagged and never emailed again.

pub mod email;
pub mod job;
pub mod scheduler;
pub mod settings;

pub use email::{EmailConfig, EmailError, EmailSender, ReminderMessage, ResendEmailSender};
pub use job::{ReminderJob, ReminderRunReport};
pub use scheduler::{DEFAULT_SCHEDULE, ReminderError, ReminderScheduler};
pub use settings::ReminderSettings;
