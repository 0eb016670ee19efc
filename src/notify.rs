//! Owner notification for inbound contact submissions.
//!
//! Delivery is best-effort and fully decoupled from persistence: the
//! submission is already stored before any notifier runs, and a failed
//! send is logged and swallowed. The default transport posts a JSON
//! message to a mail-relay webhook with `replyTo` set to the submitter.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::contact::ContactSubmission;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn contact_received(&self, submission: &ContactSubmission) -> Result<(), NotifyError>;
}

/// Message body posted to the webhook.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationPayload<'a> {
    to: &'a str,
    reply_to: &'a str,
    subject: String,
    html: String,
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    to: String,
}

impl WebhookNotifier {
    pub fn new(url: String, to: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, url, to }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn contact_received(&self, submission: &ContactSubmission) -> Result<(), NotifyError> {
        let payload = NotificationPayload {
            to: &self.to,
            reply_to: &submission.email,
            subject: format!("New Contact: {}", submission.subject),
            html: render_contact_email(submission),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Transport(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        tracing::info!(id = %submission.id, "contact notification delivered");
        Ok(())
    }
}

/// Notifier used when no webhook is configured. Submissions are still
/// persisted; this just records that delivery was skipped.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn contact_received(&self, submission: &ContactSubmission) -> Result<(), NotifyError> {
        tracing::debug!(
            id = %submission.id,
            "no notification transport configured, skipping send"
        );
        Ok(())
    }
}

fn render_contact_email(submission: &ContactSubmission) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h1>New Contact Form Submission</h1>
  <p><strong>Name:</strong> {name}</p>
  <p><strong>Email:</strong> {email}</p>
  <p><strong>Subject:</strong> {subject}</p>
  <p><strong>Received:</strong> {received}</p>
  <hr>
  <p>{message}</p>
</body>
</html>"#,
        name = escape_html(&submission.name),
        email = escape_html(&submission.email),
        subject = escape_html(&submission.subject),
        received = submission.created_at.to_rfc3339(),
        message = escape_html(&submission.message),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
