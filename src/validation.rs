//! Input validation and eligibility filtering.
//!
//! Two layers run at the start of every generation call:
//!
//! 1. [`validate_input`] checks structural integrity of the raw snapshot
//!    and reports every problem at once:
//!    - Duplicate job or equipment IDs
//!    - Negative or non-finite cycle or setup times
//!    - Jobs with no work at all
//!    - Jobs longer than [`MAX_JOB_WORK_MINS`]
//! 2. [`Registry::build`] filters the snapshot to what can be planned:
//!    jobs in a schedulable status, equipment that is not offline. Empty
//!    results are fatal; material shortages are only logged.
//!
//! Equipment in maintenance or breakdown passes the registry and is
//! excluded per placement by the allocation engine. A snapshot whose only
//! equipment is under maintenance yields an empty schedule, not an error.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{Result, SchedulingError};
use crate::models::{Equipment, Job};

/// Validation result.
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// Cycle time is negative or not a number.
    InvalidCycleTime,
    /// Setup time is negative or not a number.
    InvalidSetupTime,
    /// A job has neither setup nor processing time.
    EmptyJob,
    /// A job or placement lies outside the schedulable time range.
    WorkOutOfRange,
}

/// Upper bound on setup + processing of one job (one year, in minutes).
pub const MAX_JOB_WORK_MINS: f64 = 525_600.0;

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the raw input snapshot.
///
/// Checks:
/// 1. No duplicate job IDs
/// 2. No duplicate equipment IDs
/// 3. Cycle times are finite and non-negative
/// 4. Setup times, when present, are finite and non-negative
/// 5. Every job carries some work, at most [`MAX_JOB_WORK_MINS`]
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(jobs: &[Job], equipment: &[Equipment]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut equipment_ids = HashSet::new();
    for eq in equipment {
        if !equipment_ids.insert(eq.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate equipment ID: {}", eq.id),
            ));
        }
    }

    let mut job_ids = HashSet::new();
    for job in jobs {
        if !job_ids.insert(job.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {}", job.id),
            ));
        }

        let cycle_ok = job.cycle_time_secs.is_finite() && job.cycle_time_secs >= 0.0;
        if !cycle_ok {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCycleTime,
                format!("Job '{}' has invalid cycle time {}", job.id, job.cycle_time_secs),
            ));
        }

        let setup_ok = job
            .setup_time_mins
            .map_or(true, |s| s.is_finite() && s >= 0.0);
        if !setup_ok {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSetupTime,
                format!("Job '{}' has invalid setup time {:?}", job.id, job.setup_time_mins),
            ));
        }

        if cycle_ok && setup_ok && job.work_mins() <= 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyJob,
                format!("Job '{}' has no setup or processing time", job.id),
            ));
        }

        if cycle_ok && setup_ok && job.work_mins() > MAX_JOB_WORK_MINS {
            errors.push(ValidationError::new(
                ValidationErrorKind::WorkOutOfRange,
                format!(
                    "Job '{}' needs {} min of work, above the {} min limit",
                    job.id,
                    job.work_mins(),
                    MAX_JOB_WORK_MINS
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The eligible part of an input snapshot.
///
/// Owns copies of the jobs and equipment, so later stages never touch
/// caller data. Job copies have their deadline captured
/// (see [`Job::with_captured_deadline`]).
#[derive(Debug, Clone)]
pub struct Registry {
    /// Jobs in a schedulable status, in input order.
    pub jobs: Vec<Job>,
    /// Equipment that is not offline, in input order.
    pub equipment: Vec<Equipment>,
}

impl Registry {
    /// Validates and filters a snapshot.
    ///
    /// # Errors
    /// - [`SchedulingError::InvalidInput`] when [`validate_input`] fails
    /// - [`SchedulingError::NoEligibleJobs`] when no job is schedulable
    /// - [`SchedulingError::NoEligibleEquipment`] when all equipment is offline
    pub fn build(jobs: &[Job], equipment: &[Equipment]) -> Result<Self> {
        validate_input(jobs, equipment).map_err(SchedulingError::InvalidInput)?;

        let eligible_jobs: Vec<Job> = jobs
            .iter()
            .filter(|j| j.status.is_schedulable())
            .cloned()
            .map(Job::with_captured_deadline)
            .collect();
        if eligible_jobs.is_empty() {
            return Err(SchedulingError::NoEligibleJobs);
        }

        let eligible_equipment: Vec<Equipment> =
            equipment.iter().filter(|e| e.is_online()).cloned().collect();
        if eligible_equipment.is_empty() {
            return Err(SchedulingError::NoEligibleEquipment);
        }

        for job in &eligible_jobs {
            for material in job.missing_materials() {
                warn!(
                    job_id = %job.id,
                    material_id = %material.material_id,
                    status = ?material.status,
                    "material not available for job"
                );
            }
        }

        debug!(
            jobs = eligible_jobs.len(),
            skipped_jobs = jobs.len() - eligible_jobs.len(),
            equipment = eligible_equipment.len(),
            "registry built"
        );

        Ok(Self {
            jobs: eligible_jobs,
            equipment: eligible_equipment,
        })
    }

    /// Whether any eligible equipment can take work right now.
    pub fn has_allocatable_equipment(&self) -> bool {
        self.equipment.iter().any(Equipment::is_allocatable)
    }
}
