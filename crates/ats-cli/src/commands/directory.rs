//! Users, job postings, and applications.

use std::io::Write;

use anyhow::{Context, Result};
use ats_db::{Database, NewJob, NewUser};

use crate::{ApplicationsAction, JobsAction, UsersAction};

pub fn users<W: Write>(writer: &mut W, db: &mut Database, action: &UsersAction) -> Result<()> {
    match action {
        UsersAction::Add {
            first_name,
            last_name,
            email,
        } => {
            let user = NewUser {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: email.clone().filter(|e| !e.trim().is_empty()),
            };
            let user_id = db.add_user(&user).context("failed to create user")?;
            tracing::info!(user_id, "user created");
            writeln!(writer, "Created user {user_id}")?;
        }
    }
    Ok(())
}

pub fn jobs<W: Write>(writer: &mut W, db: &mut Database, action: &JobsAction) -> Result<()> {
    match action {
        JobsAction::Add {
            title,
            company,
            coordinator,
        } => {
            let job = NewJob {
                title: title.clone(),
                company: company.clone(),
                coordinator_id: *coordinator,
            };
            let job_id = db
                .add_job(&job)
                .with_context(|| format!("failed to create job for coordinator {coordinator}"))?;
            tracing::info!(job_id, coordinator_id = coordinator, "job created");
            writeln!(writer, "Created job {job_id}")?;
        }
    }
    Ok(())
}

pub fn applications<W: Write>(
    writer: &mut W,
    db: &mut Database,
    action: &ApplicationsAction,
) -> Result<()> {
    match action {
        ApplicationsAction::Add { candidate, job } => {
            let application = db.add_application(*candidate, *job).with_context(|| {
                format!("failed to record application of candidate {candidate} to job {job}")
            })?;
            tracing::info!(app_id = application.app_id, "application created");
            writeln!(
                writer,
                "Created application {} ({})",
                application.app_id, application.status
            )?;
        }
    }
    Ok(())
}
