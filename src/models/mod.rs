//! Production scheduling domain models.
//!
//! Inputs (`Job`, `Equipment`, `Shift`, `SchedulingConstraint`) are read
//! from a snapshot; outputs (`ProductionSchedule`, `EquipmentAllocation`)
//! are fresh values per generation call.
//!
//! # Time Representation
//!
//! Public timestamps are plant-local `NaiveDateTime`. Scheduling arithmetic
//! uses ms offsets from the shift start ([`ShiftWindow`]).

mod constraint;
mod equipment;
mod job;
mod schedule;
mod shift;

pub use constraint::{ConstraintType, SchedulingConstraint};
pub use equipment::{Equipment, EquipmentStatus};
pub use job::{Job, JobPriority, JobStatus, MaterialRequirement, MaterialStatus};
pub(crate) use job::minutes_to_ms_ceil;
pub use schedule::{Algorithm, EquipmentAllocation, ProductionSchedule};
pub use shift::{Shift, ShiftBreak, ShiftWindow, TimeWindow};
