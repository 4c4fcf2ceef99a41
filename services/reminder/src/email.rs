//! Release-day reminder emails
//!
//! [`EmailSender`] is the seam the reminder job talks to. The production
//! implementation posts to the Resend HTTP API.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Errors raised while delivering an email
#[derive(Error, Debug)]
pub enum EmailError {
    /// The provider could not be reached
    #[error("Email request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Email provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// No answer within the send timeout
    #[error("Email send timed out after {0} seconds")]
    Timeout(u64),
}

/// One reminder to deliver
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderMessage {
    pub movie_id: Uuid,
    pub to: String,
    pub title: String,
    pub release_date: DateTime<Utc>,
}

impl ReminderMessage {
    /// Same movie and release day always yield the same key, so the provider
    /// drops a second delivery of a reminder that was already accepted.
    pub fn idempotency_key(&self) -> String {
        format!(
            "movie-reminder/{}/{}",
            self.movie_id,
            self.release_date.format("%Y-%m-%d")
        )
    }

    pub fn subject(&self) -> String {
        format!("🎬 {} releases today!", self.title)
    }

    /// HTML body with the release day in the server's local calendar.
    pub fn html(&self) -> String {
        self.html_in(&Local)
    }

    pub fn html_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let day = self.release_date.with_timezone(tz).format("%d/%m/%Y");
        format!(
            r#"<div style="font-family:Arial, sans-serif;line-height:1.6">
  <h1>It's movie day! 🍿</h1>
  <p><strong>{title}</strong> releases today ({day}).</p>
  <p>Don't forget to update its status in your catalog after watching.</p>
  <p style="margin-top:24px">Enjoy the movie!</p>
</div>"#,
            title = escape_html(&self.title),
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Email delivery seam
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &ReminderMessage) -> Result<(), EmailError>;
}

/// Resend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub api_key: String,
    pub from_email: String,
    /// Base URL of the provider API
    pub api_url: String,
}

#[derive(Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
}

/// Sends reminders through `POST {api_url}/emails`
#[derive(Clone)]
pub struct ResendEmailSender {
    client: reqwest::Client,
    config: EmailConfig,
}

impl ResendEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &ReminderMessage) -> Result<(), EmailError> {
        let payload = ResendEmail {
            from: &self.config.from_email,
            to: [&message.to],
            subject: message.subject(),
            html: message.html(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .header("Idempotency-Key", message.idempotency_key())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(movie_id = %message.movie_id, "Reminder email accepted by provider");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn message() -> ReminderMessage {
        ReminderMessage {
            movie_id: Uuid::nil(),
            to: "ana@example.com".to_string(),
            title: "Tom & Jerry <3".to_string(),
            release_date: Utc.with_ymd_and_hms(2024, 7, 10, 2, 0, 0).unwrap(),
        }
    }

    #[test]
    fn body_shows_the_local_release_day() {
        let brasilia = FixedOffset::west_opt(3 * 3600).unwrap();
        let html = message().html_in(&brasilia);

        assert!(html.contains("(09/07/2024)"));
        assert!(html.contains("<strong>Tom &amp; Jerry &lt;3</strong>"));
    }

    #[test]
    fn subject_names_the_movie() {
        assert_eq!(message().subject(), "🎬 Tom & Jerry <3 releases today!");
    }

    #[test]
    fn idempotency_key_is_stable_per_movie_and_day() {
        let first = message();
        let mut later_same_day = message();
        later_same_day.release_date = Utc.with_ymd_and_hms(2024, 7, 10, 20, 0, 0).unwrap();

        assert_eq!(first.idempotency_key(), later_same_day.idempotency_key());
        assert_eq!(
            first.idempotency_key(),
            "movie-reminder/00000000-0000-0000-0000-000000000000/2024-07-10"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let sender = ResendEmailSender::new(EmailConfig {
            api_key: "re_test".to_string(),
            from_email: "movies@example.com".to_string(),
            api_url: "https://api.resend.com/".to_string(),
        });
        assert_eq!(sender.endpoint(), "https://api.resend.com/emails");
    }
}
