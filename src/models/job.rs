//! Job (work order operation) model.
//!
//! A job is one production run of `quantity` units of a product on a
//! single piece of equipment. The scheduler reads jobs from a snapshot and
//! writes `scheduled_start`, `scheduled_end` and `equipment_id` only on
//! its own copies.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A job to be scheduled.
///
/// # Deadlines
/// Upstream systems historically carry the due date in `scheduled_end`.
/// [`Job::with_captured_deadline`] copies it into `due_time` when no
/// explicit due time is set, so the deadline survives after the scheduler
/// overwrites `scheduled_end` with the planned completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Owning work order. Lexicographic order doubles as arrival order.
    pub work_order_id: String,
    /// Product being made.
    pub product_id: String,
    /// Target equipment, or the equipment assigned by the scheduler.
    pub equipment_id: Option<String>,
    /// Units to produce.
    pub quantity: u32,
    /// Seconds per unit.
    pub cycle_time_secs: f64,
    /// Setup before the first unit (minutes). `None` = no setup.
    pub setup_time_mins: Option<f64>,
    /// Lifecycle status.
    pub status: JobStatus,
    /// Business priority tier.
    pub priority: JobPriority,
    /// Planned start (written by the scheduler).
    pub scheduled_start: Option<NaiveDateTime>,
    /// Planned end (written by the scheduler; due date on input).
    pub scheduled_end: Option<NaiveDateTime>,
    /// Latest acceptable completion.
    pub due_time: Option<NaiveDateTime>,
    /// Materials consumed by this job.
    pub materials: Vec<MaterialRequirement>,
}

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Scheduled,
    Ready,
    InProgress,
    Paused,
    Completed,
    Cancelled,
    OnHold,
}

impl JobStatus {
    /// Whether a job in this status enters a new plan.
    ///
    /// Running, paused and held work is owned by execution; finished and
    /// cancelled work is gone.
    pub fn is_schedulable(self) -> bool {
        matches!(self, JobStatus::Scheduled | JobStatus::Ready)
    }
}

/// Business priority tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// A material the job consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    /// Material identifier.
    pub material_id: String,
    /// Quantity needed for the whole job.
    pub required_quantity: f64,
    /// Availability reported by inventory.
    pub status: MaterialStatus,
}

/// Inventory availability of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialStatus {
    Available,
    Reserved,
    Ordered,
    Shortage,
}

impl MaterialStatus {
    /// Available or reserved stock can be consumed without waiting.
    pub fn is_ready(self) -> bool {
        matches!(self, MaterialStatus::Available | MaterialStatus::Reserved)
    }
}

impl MaterialRequirement {
    /// Creates a material requirement.
    pub fn new(
        material_id: impl Into<String>,
        required_quantity: f64,
        status: MaterialStatus,
    ) -> Self {
        Self {
            material_id: material_id.into(),
            required_quantity,
            status,
        }
    }
}

impl Job {
    /// Creates a ready job with no work attached.
    pub fn new(id: impl Into<String>, work_order_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            work_order_id: work_order_id.into(),
            product_id: String::new(),
            equipment_id: None,
            quantity: 0,
            cycle_time_secs: 0.0,
            setup_time_mins: None,
            status: JobStatus::Ready,
            priority: JobPriority::Normal,
            scheduled_start: None,
            scheduled_end: None,
            due_time: None,
            materials: Vec::new(),
        }
    }

    /// Sets the product.
    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    /// Sets quantity and cycle time (seconds per unit).
    pub fn with_work(mut self, quantity: u32, cycle_time_secs: f64) -> Self {
        self.quantity = quantity;
        self.cycle_time_secs = cycle_time_secs;
        self
    }

    /// Sets the setup time (minutes).
    pub fn with_setup(mut self, minutes: f64) -> Self {
        self.setup_time_mins = Some(minutes);
        self
    }

    /// Sets the target equipment.
    pub fn with_equipment(mut self, equipment_id: impl Into<String>) -> Self {
        self.equipment_id = Some(equipment_id.into());
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority tier.
    pub fn with_priority(mut self, priority: JobPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due time.
    pub fn with_due_time(mut self, due: NaiveDateTime) -> Self {
        self.due_time = Some(due);
        self
    }

    /// Adds a material requirement.
    pub fn with_material(mut self, material: MaterialRequirement) -> Self {
        self.materials.push(material);
        self
    }

    /// Setup time in minutes (0 when absent).
    #[inline]
    pub fn setup_mins(&self) -> f64 {
        self.setup_time_mins.unwrap_or(0.0)
    }

    /// Pure processing time in minutes: quantity x cycle time / 60.
    #[inline]
    pub fn processing_mins(&self) -> f64 {
        self.quantity as f64 * self.cycle_time_secs / 60.0
    }

    /// Setup plus processing, in minutes.
    #[inline]
    pub fn work_mins(&self) -> f64 {
        self.setup_mins() + self.processing_mins()
    }

    /// Setup plus processing in ms, rounded up so a placement of this
    /// length never undercuts the real work.
    pub fn work_ms(&self) -> i64 {
        minutes_to_ms_ceil(self.work_mins())
    }

    /// Materials not yet available or reserved.
    pub fn missing_materials(&self) -> impl Iterator<Item = &MaterialRequirement> {
        self.materials.iter().filter(|m| !m.status.is_ready())
    }

    /// Copies the input `scheduled_end` into `due_time` when no due time is set.
    pub fn with_captured_deadline(mut self) -> Self {
        if self.due_time.is_none() {
            self.due_time = self.scheduled_end;
        }
        self
    }

    /// Returns a placed copy of this job.
    pub fn placed(&self, equipment_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let mut job = self.clone();
        job.equipment_id = Some(equipment_id.to_string());
        job.scheduled_start = Some(start);
        job.scheduled_end = Some(end);
        job
    }

    /// Minutes past the due time (0 when on time, early, or without a due time).
    pub fn tardiness_mins(&self) -> f64 {
        match (self.scheduled_end, self.due_time) {
            (Some(end), Some(due)) if end > due => (end - due).num_milliseconds() as f64 / 60_000.0,
            _ => 0.0,
        }
    }
}

/// Converts minutes to whole ms, rounding up.
pub(crate) fn minutes_to_ms_ceil(minutes: f64) -> i64 {
    (minutes * 60_000.0).ceil() as i64
}
