use crate::error::{ConsortiumError, Result};
use crate::events::EventBus;
use crate::sync::ConsortiumSync;
use rimp_models::{CopyYears, Year};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of copying one year's consortium onto other years
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropagationOutcome {
    pub source_year: Year,
    pub target_years: Vec<Year>,
    pub organizations_message: String,
    pub members_message: String,
}

/// Shared "copy in flight" flag of one sync
#[derive(Debug, Clone, Default)]
pub struct PropagationStatus {
    running: Arc<AtomicBool>,
}

impl PropagationStatus {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark a copy as running. `None` if one already is.
    fn start(&self, events: &EventBus) -> Option<PropagationGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        events.propagation(true);
        Some(PropagationGuard {
            status: self.clone(),
            events: events.clone(),
        })
    }
}

/// Clears the running flag when dropped, including when the copy future is
/// cancelled mid-flight
struct PropagationGuard {
    status: PropagationStatus,
    events: EventBus,
}

impl Drop for PropagationGuard {
    fn drop(&mut self) {
        self.status.running.store(false, Ordering::SeqCst);
        self.events.propagation(false);
    }
}

impl ConsortiumSync {
    /// Copy year 1 onto `target_years`
    pub async fn propagate(&mut self, target_years: &[Year]) -> Result<PropagationOutcome> {
        self.propagate_from(1, target_years).await
    }

    /// Copy `source_year`'s organizations and members onto `target_years`.
    ///
    /// The organization copy runs first; the member copy is only attempted
    /// after it succeeds. Afterwards every target year and then the source
    /// year are refetched. A failed organization copy is not rolled back.
    pub async fn propagate_from(
        &mut self,
        source_year: Year,
        target_years: &[Year],
    ) -> Result<PropagationOutcome> {
        const ACTION: &str = "Copy to other years";

        let targets = match self.check_propagation(source_year, target_years) {
            Ok(targets) => targets,
            Err(e) => return Err(self.fail(ACTION, e)),
        };

        let Some(_running) = self.propagation.start(&self.events) else {
            return Err(self.fail(ACTION, already_running()));
        };
        self.run_propagation(source_year, targets).await
    }

    fn check_propagation(&self, source_year: Year, target_years: &[Year]) -> Result<Vec<Year>> {
        if !self.mode.is_multi() {
            return Err(ConsortiumError::InvalidState(
                "Copying between years requires a multi-year project".to_string(),
            ));
        }
        if self.propagation.is_running() {
            return Err(already_running());
        }
        if !self.mode.contains(source_year) {
            return Err(ConsortiumError::Validation(format!(
                "Source year {} is outside the project",
                source_year
            )));
        }

        let mut targets = target_years.to_vec();
        targets.sort_unstable();
        targets.dedup();

        if let Some(bad) = targets
            .iter()
            .find(|&&y| y == source_year || !self.mode.contains(y))
        {
            return Err(ConsortiumError::Validation(format!(
                "Target year {} must be another year of the project",
                bad
            )));
        }
        if targets.is_empty() {
            return Err(ConsortiumError::Validation(
                "Select at least one target year".to_string(),
            ));
        }
        Ok(targets)
    }

    async fn run_propagation(
        &mut self,
        source_year: Year,
        target_years: Vec<Year>,
    ) -> Result<PropagationOutcome> {
        let request = CopyYears {
            project_planning_id: self.project_id,
            source_year,
            target_years,
        };

        tracing::info!(
            "Copying project {} year {} to years {:?}",
            self.project_id,
            source_year,
            request.target_years
        );

        let organizations_message = self
            .api
            .copy_organizations(&request)
            .await
            .map_err(|e| self.fail("Copy organizations", e))?;

        let members_message = self
            .api
            .copy_members(&request)
            .await
            .map_err(|e| self.fail("Copy members", e))?;

        for &year in &request.target_years {
            self.refresh_year(year).await?;
        }
        self.refresh_year(source_year).await?;

        tracing::info!("Copied project {} year {}", self.project_id, source_year);

        Ok(PropagationOutcome {
            source_year,
            target_years: request.target_years,
            organizations_message,
            members_message,
        })
    }
}

fn already_running() -> ConsortiumError {
    ConsortiumError::InvalidState("A copy between years is already running".to_string())
}
