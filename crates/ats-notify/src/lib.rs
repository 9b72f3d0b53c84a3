//! Email notifications for the interview scheduler.
//!
//! Provides:
//! - An HTTP client for a Resend-compatible email API
//! - Rendering of interview invitations
//! - A background queue so booking never waits on mail delivery

mod queue;

use std::fmt;
use std::time::Duration;

use ats_core::InterviewInvitation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use queue::{NotificationQueue, QueueStats};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_API_URL: &str = "https://api.resend.com/emails";
pub const DEFAULT_SENDER: &str = "onboarding@resend.dev";

/// Notification errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The background worker could not be started.
    #[error("failed to start notification worker: {0}")]
    Worker(#[source] std::io::Error),
}

/// A rendered email message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
    sender: String,
}

impl fmt::Debug for EmailClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailClient")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl EmailClient {
    /// Creates a client for the default API endpoint and sender.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_endpoint(api_key, DEFAULT_API_URL, DEFAULT_SENDER)
    }

    /// Creates a client posting to `api_url` and sending from `sender`.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        sender: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(NotifyError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(NotifyError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(NotifyError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            api_url: api_url.into(),
            sender: sender.into(),
        })
    }

    /// Sends an email and returns the provider's message id.
    pub async fn send(&self, email: &Email) -> Result<String, NotifyError> {
        let request = SendRequest {
            from: &self.sender,
            to: vec![&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| NotifyError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: SendResponse = serde_json::from_str(&body)
            .map_err(|err| NotifyError::InvalidResponse(err.to_string()))?;
        Ok(payload.id)
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

fn parse_api_error(body: &str) -> Option<NotifyError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        message: String,
        #[serde(default)]
        name: Option<String>,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| NotifyError::Api {
            message: match payload.name {
                Some(name) => format!("{name}: {}", payload.message),
                None => payload.message,
            },
        })
}

/// Renders the invitation email sent to a candidate after booking.
pub fn render_invitation(invitation: &InterviewInvitation) -> Email {
    let name = escape_html(&invitation.candidate_name);
    let title = escape_html(&invitation.job_title);
    let company = escape_html(&invitation.company);
    let when = invitation.start_time.format("%A, %B %-d, %Y at %H:%M");

    let mut html = Vec::new();
    html.push(format!("<p>Hi {name},</p>"));
    html.push(format!(
        "<p>Congratulations! We would like to invite you for an interview for the \
         <strong>{title}</strong> role at <strong>{company}</strong>.</p>"
    ));
    html.push(format!("<p>Your interview is scheduled for {when}.</p>"));
    if let Some(app_id) = invitation.application_id {
        html.push(format!("<p>Application reference: #{app_id}</p>"));
    }
    html.push(format!(
        "<p>Best regards,<br/>The Hiring Team at {company}</p>"
    ));

    Email {
        to: invitation.candidate_email.clone(),
        subject: format!(
            "Interview Invitation for the {} position at {}",
            invitation.job_title, invitation.company
        ),
        html: html.join("\n"),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
