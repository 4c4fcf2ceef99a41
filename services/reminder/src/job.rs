//! One pass of the release-day reminder scan

use std::{sync::Arc, time::Duration};

use catalog::{MovieStore, models::DueReminder};
use common::{clock::Clock, error::DatabaseError};
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::email::{EmailError, EmailSender, ReminderMessage};

/// Outcome of a single firing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderRunReport {
    /// Movies releasing today that were still un-reminded
    pub due: usize,
    /// Reminders delivered and flagged
    pub sent: usize,
    /// Reminders left for the next firing
    pub failed: usize,
}

/// What became of one due reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Delivered and flagged
    Sent,
    /// Left un-flagged for the next firing
    Failed,
}

/// Finds today's releases and emails their owners, one movie at a time.
pub struct ReminderJob {
    store: Arc<dyn MovieStore>,
    sender: Arc<dyn EmailSender>,
    clock: Arc<dyn Clock>,
    send_timeout: Duration,
}

impl ReminderJob {
    pub fn new(
        store: Arc<dyn MovieStore>,
        sender: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            sender,
            clock,
            send_timeout,
        }
    }

    /// Scan the current local day and deliver every pending reminder.
    ///
    /// A failed delivery leaves the movie un-flagged so the next firing
    /// retries it; it never stops the rest of the batch.
    pub async fn run_once(&self) -> Result<ReminderRunReport, DatabaseError> {
        let (day_start, day_end) = self.clock.today_bounds();
        let due = self.store.find_due_for_reminder(day_start, day_end).await?;

        let mut report = ReminderRunReport {
            due: due.len(),
            ..Default::default()
        };

        for reminder in due {
            match self.remind(&reminder).await {
                Delivery::Sent => report.sent += 1,
                Delivery::Failed => report.failed += 1,
            }
        }

        info!(
            due = report.due,
            sent = report.sent,
            failed = report.failed,
            "Reminder run finished"
        );
        Ok(report)
    }

    async fn remind(&self, reminder: &DueReminder) -> Delivery {
        let message = ReminderMessage {
            movie_id: reminder.movie_id,
            to: reminder.email.clone(),
            title: reminder.title.clone(),
            release_date: reminder.release_date,
        };

        if let Err(e) = self.deliver(&message).await {
            error!(
                movie_id = %reminder.movie_id,
                owner_id = %reminder.owner_id,
                "Failed to send reminder email: {}", e
            );
            return Delivery::Failed;
        }

        if let Err(e) = self.store.mark_reminder_sent(reminder.movie_id).await {
            // Delivered but not flagged: the next firing sends again unless the
            // provider drops it by idempotency key.
            warn!(
                movie_id = %reminder.movie_id,
                "Reminder sent but flag not saved: {}", e
            );
            return Delivery::Failed;
        }

        info!(
            movie_id = %reminder.movie_id,
            owner_id = %reminder.owner_id,
            "Reminder sent"
        );
        Delivery::Sent
    }

    async fn deliver(&self, message: &ReminderMessage) -> Result<(), EmailError> {
        match timeout(self.send_timeout, self.sender.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(EmailError::Timeout(self.send_timeout.as_secs())),
        }
    }
}
