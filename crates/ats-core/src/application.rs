//! Application-tracking records the scheduler reads or nudges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ApplicationId, JobId, UserId};

/// Hiring pipeline state of a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationStatus {
    Applied,
    Interviewing,
    Offered,
    OfferRejected,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Interviewing => "Interviewing",
            Self::Offered => "Offered",
            Self::OfferRejected => "Offer Rejected",
            Self::Hired => "Hired",
            Self::Rejected => "Rejected",
        }
    }

    /// Whether the pipeline allows moving from `self` to `next`.
    ///
    /// Booking a further round keeps an interviewing application where it is.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Applied, Self::Interviewing | Self::Rejected)
                | (
                    Self::Interviewing,
                    Self::Interviewing | Self::Offered | Self::Rejected
                )
                | (Self::Offered, Self::Hired | Self::OfferRejected)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Hired | Self::Rejected | Self::OfferRejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Applied" => Ok(Self::Applied),
            "Interviewing" => Ok(Self::Interviewing),
            "Offered" => Ok(Self::Offered),
            "Offer Rejected" => Ok(Self::OfferRejected),
            "Hired" => Ok(Self::Hired),
            "Rejected" => Ok(Self::Rejected),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown application status strings.
#[derive(Debug, Clone)]
pub struct UnknownStatus(String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown application status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

/// A candidate's application to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub app_id: ApplicationId,
    pub candidate_id: UserId,
    pub job_id: JobId,
    pub status: ApplicationStatus,
}

/// Contact details needed to invite a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub user_id: UserId,
    pub first_name: String,
    pub email: Option<String>,
}

/// The parts of a job posting that appear in an invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job_id: JobId,
    pub title: String,
    pub company: String,
    pub coordinator_id: UserId,
}
