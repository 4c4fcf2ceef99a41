//! Process-wide reminder scheduler
//!
//! Idle until [`ReminderScheduler::start`] is called; from then on it fires
//! once right away and again on every tick of its cron schedule.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use chrono::{Local, TimeZone};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info, warn};

use crate::job::{ReminderJob, ReminderRunReport};

/// Top of every hour (`sec min hour day month weekday`)
pub const DEFAULT_SCHEDULE: &str = "0 0 * * * *";

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

/// Runs the job and refuses to start a firing while another is in flight.
#[derive(Clone)]
struct Firing {
    job: Arc<ReminderJob>,
    in_flight: Arc<Mutex<()>>,
}

impl Firing {
    async fn fire(&self) -> Option<ReminderRunReport> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Previous reminder run still in progress, skipping this firing");
            return None;
        };

        match self.job.run_once().await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Reminder run failed: {}", e);
                None
            }
        }
    }
}

pub struct ReminderScheduler {
    firing: Firing,
    schedule: String,
    started: AtomicBool,
    scheduler: Mutex<Option<JobScheduler>>,
}

impl ReminderScheduler {
    pub fn new(job: ReminderJob, schedule: impl Into<String>) -> Self {
        Self {
            firing: Firing {
                job: Arc::new(job),
                in_flight: Arc::new(Mutex::new(())),
            },
            schedule: schedule.into(),
            started: AtomicBool::new(false),
            scheduler: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Register the recurring trigger and fire once in the background.
    ///
    /// Returns `false` without doing anything when already running.
    pub async fn start(&self) -> Result<bool, ReminderError> {
        if self.started.swap(true, Ordering::SeqCst) {
            info!("Reminder scheduler already running");
            return Ok(false);
        }

        match self.register().await {
            Ok(scheduler) => {
                *self.scheduler.lock().await = Some(scheduler);
            }
            Err(e) => {
                self.started.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }

        let firing = self.firing.clone();
        tokio::spawn(async move {
            firing.fire().await;
        });

        info!("Started reminder scheduler with schedule: {}", self.schedule);
        Ok(true)
    }

    /// Fire now, outside the schedule. `None` when a firing is in flight.
    pub async fn fire_now(&self) -> Option<ReminderRunReport> {
        self.firing.fire().await
    }

    async fn register(&self) -> Result<JobScheduler, ReminderError> {
        let scheduler = JobScheduler::new().await?;

        let job = cron_job(&self.schedule, Local, self.firing.clone())?;

        scheduler.add(job).await?;
        scheduler.start().await?;
        Ok(scheduler)
    }
}

/// Cron ticks are read as wall-clock time in `tz`, so "top of the hour" is
/// the local one even under half-hour offsets.
fn cron_job<Tz>(schedule: &str, tz: Tz, firing: Firing) -> Result<Job, JobSchedulerError>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    Job::new_async_tz(schedule, tz, move |_, _| {
        let firing = firing.clone();
        Box::pin(async move {
            info!("Reminder job executed");
            firing.fire().await;
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use catalog::InMemoryMovieStore;
    use chrono::{FixedOffset, Timelike, Utc};
    use common::clock::FixedClock;

    use crate::email::{EmailError, EmailSender, ReminderMessage};

    struct Silent;

    #[async_trait]
    impl EmailSender for Silent {
        async fn send(&self, _message: &ReminderMessage) -> Result<(), EmailError> {
            Ok(())
        }
    }

    fn firing() -> Firing {
        let job = ReminderJob::new(
            Arc::new(InMemoryMovieStore::new()),
            Arc::new(Silent),
            Arc::new(FixedClock::utc(Utc::now())),
            Duration::from_secs(1),
        );
        Firing {
            job: Arc::new(job),
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    #[tokio::test]
    async fn hourly_ticks_follow_the_local_wall_clock() {
        let kolkata = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let job = cron_job(DEFAULT_SCHEDULE, kolkata, firing()).unwrap();

        let mut scheduler = JobScheduler::new().await.unwrap();
        let id = scheduler.add(job).await.unwrap();
        let next = scheduler
            .next_tick_for_job(id)
            .await
            .unwrap()
            .expect("hourly job has a next tick");

        let local = next.with_timezone(&kolkata);
        assert_eq!((local.minute(), local.second()), (0, 0));
        assert_eq!(next.minute(), 30);
    }

    #[test]
    fn malformed_schedule_is_rejected() {
        assert!(cron_job("every hour", Local, firing()).is_err());
    }
}
