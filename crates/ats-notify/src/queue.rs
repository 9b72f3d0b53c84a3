//! Fire-and-forget delivery of interview invitations.

use std::thread::{self, JoinHandle};

use ats_core::{InterviewInvitation, Notifier};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{EmailClient, NotifyError, render_invitation};

/// Counts of what the worker did with the invitations it received.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Hands invitations to a dedicated worker thread.
///
/// The worker owns a single-threaded `tokio` runtime and sends each invitation
/// in arrival order. [`Notifier::notify`] only enqueues, so callers never wait
/// on the mail provider. Without a client every invitation is logged and
/// skipped.
pub struct NotificationQueue {
    sender: Option<mpsc::UnboundedSender<InterviewInvitation>>,
    worker: Option<JoinHandle<QueueStats>>,
}

impl NotificationQueue {
    /// Starts the worker thread.
    pub fn spawn(client: Option<EmailClient>) -> Result<Self, NotifyError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(NotifyError::Worker)?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = thread::Builder::new()
            .name("ats-notify".to_string())
            .spawn(move || runtime.block_on(drain(client, receiver)))
            .map_err(NotifyError::Worker)?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Stops accepting invitations, waits for queued ones to finish, and
    /// reports what happened to them.
    pub fn shutdown(mut self) -> QueueStats {
        self.close()
    }

    fn close(&mut self) -> QueueStats {
        drop(self.sender.take());
        let Some(worker) = self.worker.take() else {
            return QueueStats::default();
        };
        worker.join().unwrap_or_else(|_| {
            error!("notification worker panicked");
            QueueStats::default()
        })
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, invitation: InterviewInvitation) {
        let interview_id = invitation.interview_id;
        let Some(sender) = &self.sender else {
            warn!(interview_id, "notification queue closed, dropping invitation");
            return;
        };
        if sender.send(invitation).is_err() {
            error!(interview_id, "notification worker stopped, dropping invitation");
        } else {
            debug!(interview_id, "invitation queued");
        }
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        self.close();
    }
}

async fn drain(
    client: Option<EmailClient>,
    mut receiver: mpsc::UnboundedReceiver<InterviewInvitation>,
) -> QueueStats {
    let mut stats = QueueStats::default();
    while let Some(invitation) = receiver.recv().await {
        let Some(client) = &client else {
            warn!(
                interview_id = invitation.interview_id,
                to = %invitation.candidate_email,
                "email API key not set, skipping invitation"
            );
            stats.skipped += 1;
            continue;
        };
        let email = render_invitation(&invitation);
        match client.send(&email).await {
            Ok(message_id) => {
                info!(
                    interview_id = invitation.interview_id,
                    to = %email.to,
                    message_id = %message_id,
                    "interview invitation sent"
                );
                stats.delivered += 1;
            }
            Err(err) => {
                error!(
                    interview_id = invitation.interview_id,
                    to = %email.to,
                    error = %err,
                    "failed to send interview invitation"
                );
                stats.failed += 1;
            }
        }
    }
    stats
}
