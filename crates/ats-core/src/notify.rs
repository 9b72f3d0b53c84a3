//! Notification handoff.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{ApplicationId, InterviewId};

/// Everything needed to tell a candidate about a booked interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewInvitation {
    pub interview_id: InterviewId,
    pub candidate_email: String,
    pub candidate_name: String,
    pub job_title: String,
    pub company: String,
    pub application_id: Option<ApplicationId>,
    pub start_time: NaiveDateTime,
}

/// Accepts invitations for delivery.
///
/// Implementations must return without waiting on delivery and must not
/// report delivery failures to the caller.
pub trait Notifier {
    fn notify(&self, invitation: InterviewInvitation);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, invitation: InterviewInvitation) {
        (**self).notify(invitation);
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, invitation: InterviewInvitation) {
        (**self).notify(invitation);
    }
}

/// Drops every invitation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, invitation: InterviewInvitation) {
        tracing::debug!(
            interview_id = invitation.interview_id,
            "notifications disabled, dropping invitation"
        );
    }
}
