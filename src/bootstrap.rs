//! # Bootstrap procedure
//!
//! Provisions a fresh server in one linear pass:
//!
//! 1. create the application user, scoped read/write to the plan's database
//! 2. create the collection
//! 3. create the unique index on that collection
//!
//! The start marker is written before the first call and the end marker only
//! after the last one succeeds. A failing step aborts the rest; steps already
//! applied on the server stay applied. Running twice against the same server
//! fails on the second run.

use std::io::Write;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info};

use crate::{
    db::AdminSession,
    errors::BootstrapError,
    models::{BootstrapPlan, BootstrapReport, Step},
};

pub const START_MARKER: &str =
    "Start #################################################################";
pub const END_MARKER: &str =
    "END #################################################################";

/// The administrative calls `run` issues, in order.
pub fn describe(plan: &BootstrapPlan) -> Vec<(Step, String)> {
    Step::ALL
        .iter()
        .map(|step| (*step, step.describe(plan)))
        .collect()
}

pub async fn run<S, W>(
    session: &S,
    plan: &BootstrapPlan,
    out: &mut W,
) -> Result<BootstrapReport, BootstrapError>
where
    S: AdminSession,
    W: Write,
{
    let started_at = Utc::now();
    let timer = Instant::now();

    writeln!(out, "{START_MARKER}")?;
    out.flush()?;

    let mut steps_completed = Vec::with_capacity(Step::ALL.len());

    for step in Step::ALL {
        info!(%step, "{}", step.describe(plan));
        let result = match step {
            Step::CreateUser => session.create_user(&plan.database, &plan.user).await,
            Step::CreateCollection => {
                session
                    .create_collection(&plan.database, &plan.collection)
                    .await
            }
            Step::CreateIndex => session.create_index(&plan.database, &plan.index).await,
        };

        if let Err(e) = result {
            error!(%step, error = %e, completed = steps_completed.len(), "bootstrap aborted");
            return Err(e);
        }
        steps_completed.push(step);
    }

    writeln!(out, "{END_MARKER}")?;
    out.flush()?;

    info!(
        database = %plan.database,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "bootstrap complete"
    );

    Ok(BootstrapReport {
        database: plan.database.clone(),
        steps_completed,
        started_at,
        finished_at: Utc::now(),
    })
}
