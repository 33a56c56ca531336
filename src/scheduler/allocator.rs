//! Sequential earliest-available allocation engine.
//!
//! # Algorithm
//!
//! Each equipment keeps an availability clock, starting at the shift start.
//! A job is placed on the compatible equipment whose clock is earliest
//! (first in iteration order on ties), from that clock for
//! setup + processing + buffer, and the clock advances to the end.
//!
//! Every strategy funnels through this engine: dispatch rules feed it a
//! sorted order, GA and SA feed it permutations.
//!
//! # Complexity
//! O(n * m) where n=jobs, m=equipment.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use tracing::{debug, warn};

use crate::error::{Result, SchedulingError};
use crate::models::{Equipment, EquipmentAllocation, Job, ShiftWindow};
use crate::validation::{ValidationError, ValidationErrorKind};

/// A placement in plan coordinates (ms from shift start).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Index into the problem's job list.
    pub job: usize,
    /// Index into the problem's equipment list.
    pub equipment: usize,
    /// Start offset (ms).
    pub start_ms: i64,
    /// End offset (ms, exclusive).
    pub end_ms: i64,
    /// Setup + processing inside the slot (ms).
    pub work_ms: i64,
}

impl Slot {
    /// Allocated span (ms).
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Work share of the span, in percent.
    pub fn utilization(&self) -> f64 {
        let span = self.duration_ms();
        if span <= 0 {
            return 0.0;
        }
        self.work_ms as f64 / span as f64 * 100.0
    }

    /// Whether two slots share equipment and intersect in time.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.equipment == other.equipment
            && self.start_ms < other.end_ms
            && other.start_ms < self.end_ms
    }

    /// Converts the slot to wall-clock time: the placed copy of `job`
    /// and its allocation on `equipment`.
    ///
    /// Placements running past the shift end are kept and logged.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidInput`] when the slot ends beyond the
    /// calendar range.
    pub fn realize(
        &self,
        job: &Job,
        equipment: &Equipment,
        window: &ShiftWindow,
    ) -> Result<(Job, EquipmentAllocation)> {
        let shift_end_ms = window.duration_ms();
        if self.end_ms > shift_end_ms {
            debug!(
                job_id = %job.id,
                equipment_id = %equipment.id,
                overrun_ms = self.end_ms.saturating_sub(shift_end_ms),
                "placement runs past shift end"
            );
        }

        let (Some(start), Some(end)) = (window.at(self.start_ms), window.at(self.end_ms)) else {
            return Err(SchedulingError::InvalidInput(vec![ValidationError::new(
                ValidationErrorKind::WorkOutOfRange,
                format!(
                    "Job '{}' on '{}' would end beyond the calendar range",
                    job.id, equipment.id
                ),
            )]));
        };

        let allocation = EquipmentAllocation {
            equipment_id: equipment.id.clone(),
            job_id: job.id.clone(),
            start,
            end,
            utilization_percentage: self.utilization(),
        };
        Ok((job.placed(&equipment.id, start, end), allocation))
    }
}

/// The outcome of a strategy, before conversion to wall-clock time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// Placements in placement order.
    pub slots: Vec<Slot>,
    /// Jobs that could not be placed, in attempt order.
    pub unscheduled: Vec<usize>,
}

impl Plan {
    /// A plan that places nothing.
    pub fn unplaced(job_count: usize) -> Self {
        Self {
            slots: Vec::new(),
            unscheduled: (0..job_count).collect(),
        }
    }

    /// Latest end minus earliest start (ms). 0 when empty.
    pub fn makespan_ms(&self) -> i64 {
        let start = self.slots.iter().map(|s| s.start_ms).min();
        let end = self.slots.iter().map(|s| s.end_ms).max();
        match (start, end) {
            (Some(s), Some(e)) => e - s,
            _ => 0,
        }
    }
}

/// Whether equipment may take new work.
///
/// Compatibility is status-based: every allocatable equipment can run any job.
#[inline]
pub fn is_compatible(equipment: &Equipment) -> bool {
    equipment.is_allocatable()
}

/// Per-equipment availability clocks over a fixed equipment list.
///
/// # Example
///
/// ```
/// use prod_schedule::scheduler::Allocator;
/// use prod_schedule::models::Equipment;
///
/// let equipment = vec![Equipment::new("M1"), Equipment::new("M2")];
/// let mut allocator = Allocator::new(&equipment, 0);
///
/// let first = allocator.place(0, 60_000).unwrap();
/// let second = allocator.place(1, 30_000).unwrap();
/// assert_eq!((first.equipment, second.equipment), (0, 1));
/// assert_eq!(allocator.place(2, 1_000).unwrap().start_ms, 30_000);
/// ```
#[derive(Debug, Clone)]
pub struct Allocator<'a> {
    equipment: &'a [Equipment],
    available_ms: Vec<i64>,
    buffer_ms: i64,
}

impl<'a> Allocator<'a> {
    /// Creates an allocator with every clock at the shift start.
    ///
    /// `buffer_ms` is appended to every placement.
    pub fn new(equipment: &'a [Equipment], buffer_ms: i64) -> Self {
        Self {
            equipment,
            available_ms: vec![0; equipment.len()],
            buffer_ms,
        }
    }

    /// Sets the availability clock of one equipment (ms from shift start).
    ///
    /// Unknown IDs are ignored.
    pub fn with_availability(mut self, equipment_id: &str, available_ms: i64) -> Self {
        if let Some(i) = self.equipment.iter().position(|e| e.id == equipment_id) {
            self.available_ms[i] = available_ms;
        }
        self
    }

    /// Current availability of an equipment (ms from shift start).
    pub fn availability_ms(&self, equipment_id: &str) -> Option<i64> {
        self.equipment
            .iter()
            .position(|e| e.id == equipment_id)
            .map(|i| self.available_ms[i])
    }

    /// Whether any equipment can take work.
    pub fn has_capacity(&self) -> bool {
        self.equipment.iter().any(is_compatible)
    }

    /// Index of the compatible equipment with the earliest clock.
    fn earliest(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, eq) in self.equipment.iter().enumerate() {
            if !is_compatible(eq) {
                continue;
            }
            match best {
                Some(b) if self.available_ms[b] <= self.available_ms[i] => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Places job `job` with `work_ms` of setup + processing.
    ///
    /// Returns `None` when no equipment is compatible.
    pub fn place(&mut self, job: usize, work_ms: i64) -> Option<Slot> {
        let equipment = self.earliest()?;
        let start_ms = self.available_ms[equipment];
        let end_ms = start_ms.saturating_add(work_ms).saturating_add(self.buffer_ms);
        self.available_ms[equipment] = end_ms;

        Some(Slot {
            job,
            equipment,
            start_ms,
            end_ms,
            work_ms,
        })
    }

    /// Places jobs in the given order.
    ///
    /// `work_ms[j]` is the work of job index `j`.
    pub fn sequence(&mut self, order: &[usize], work_ms: &[i64]) -> Plan {
        let mut plan = Plan {
            slots: Vec::with_capacity(order.len()),
            unscheduled: Vec::new(),
        };
        for &j in order {
            match self.place(j, work_ms[j]) {
                Some(slot) => plan.slots.push(slot),
                None => plan.unscheduled.push(j),
            }
        }
        plan
    }

    /// Places one job and returns its placed copy and allocation.
    ///
    /// Logs a warning and returns `Ok(None)` when no equipment is compatible.
    ///
    /// # Errors
    /// See [`Slot::realize`].
    pub fn allocate(
        &mut self,
        job: &Job,
        window: &ShiftWindow,
    ) -> Result<Option<(Job, EquipmentAllocation)>> {
        let Some(slot) = self.place(0, job.work_ms()) else {
            warn!(job_id = %job.id, "no compatible equipment for job");
            return Ok(None);
        };
        slot.realize(job, &self.equipment[slot.equipment], window).map(Some)
    }
}
