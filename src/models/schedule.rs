//! Production schedule (solution) model.
//!
//! A schedule is the result of one generation call: placed job copies,
//! their equipment allocations, the constraints it was generated under,
//! and the optimization score. It is never mutated after being returned;
//! re-planning produces a new schedule.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Job, SchedulingConstraint, Shift};

/// The strategy that produced a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// First in, first out (work order order).
    Fifo,
    /// Shortest processing time first.
    ShortestProcessingTime,
    /// Earliest due date first.
    EarliestDueDate,
    /// Lowest critical ratio first.
    CriticalRatio,
    /// Permutation genetic algorithm.
    Genetic,
    /// Permutation simulated annealing.
    SimulatedAnnealing,
    /// Depth-first backtracking over discrete time slots.
    ConstraintSatisfaction,
}

impl Algorithm {
    /// All strategies, in declaration order.
    pub const ALL: [Algorithm; 7] = [
        Algorithm::Fifo,
        Algorithm::ShortestProcessingTime,
        Algorithm::EarliestDueDate,
        Algorithm::CriticalRatio,
        Algorithm::Genetic,
        Algorithm::SimulatedAnnealing,
        Algorithm::ConstraintSatisfaction,
    ];

    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Fifo => "FIFO",
            Algorithm::ShortestProcessingTime => "SPT",
            Algorithm::EarliestDueDate => "EDD",
            Algorithm::CriticalRatio => "CR",
            Algorithm::Genetic => "GA",
            Algorithm::SimulatedAnnealing => "SA",
            Algorithm::ConstraintSatisfaction => "CSP",
        }
    }

    /// Whether identical inputs always give identical output without a seed.
    pub fn is_deterministic(self) -> bool {
        !matches!(self, Algorithm::Genetic | Algorithm::SimulatedAnnealing)
    }
}

/// A job placed on a piece of equipment for [start, end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentAllocation {
    /// Allocated equipment.
    pub equipment_id: String,
    /// Placed job.
    pub job_id: String,
    /// Allocation start.
    pub start: NaiveDateTime,
    /// Allocation end (exclusive).
    pub end: NaiveDateTime,
    /// (setup + processing) / (end - start) x 100.
    pub utilization_percentage: f64,
}

impl EquipmentAllocation {
    /// Allocated span (ms).
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    /// Allocated span (minutes).
    #[inline]
    pub fn duration_mins(&self) -> f64 {
        self.duration_ms() as f64 / 60_000.0
    }

    /// Whether two allocations share equipment and intersect in time.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.equipment_id == other.equipment_id && self.start < other.end && other.start < self.end
    }
}

/// A complete production schedule for one plant, shift and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSchedule {
    /// Deterministic identifier derived from plant, date, shift and algorithm.
    pub id: Uuid,
    /// Plant the schedule belongs to.
    pub plant_id: String,
    /// Shift the schedule covers.
    pub shift: Shift,
    /// Calendar date of the shift start.
    pub date: NaiveDate,
    /// Strategy that produced this schedule.
    pub algorithm: Algorithm,
    /// Placed job copies, in placement order.
    pub jobs: Vec<Job>,
    /// One allocation per placed job.
    pub allocations: Vec<EquipmentAllocation>,
    /// Eligible jobs that could not be placed.
    pub unscheduled_job_ids: Vec<String>,
    /// Constraints the schedule was generated under.
    pub constraints: Vec<SchedulingConstraint>,
    /// Quality score in [0, 100].
    pub optimization_score: f64,
}

impl ProductionSchedule {
    /// Creates an empty schedule.
    pub fn new(
        plant_id: impl Into<String>,
        shift: Shift,
        date: NaiveDate,
        algorithm: Algorithm,
    ) -> Self {
        let plant_id = plant_id.into();
        let id = Self::derive_id(&plant_id, &shift.name, date, algorithm);
        Self {
            id,
            plant_id,
            shift,
            date,
            algorithm,
            jobs: Vec::new(),
            allocations: Vec::new(),
            unscheduled_job_ids: Vec::new(),
            constraints: Vec::new(),
            optimization_score: 0.0,
        }
    }

    /// UUIDv5 over plant, shift, date and algorithm.
    pub fn derive_id(
        plant_id: &str,
        shift_name: &str,
        date: NaiveDate,
        algorithm: Algorithm,
    ) -> Uuid {
        let name = format!("{plant_id}/{date}/{shift_name}/{}", algorithm.name());
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }

    /// Whether nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    /// Number of placed jobs.
    pub fn placed_count(&self) -> usize {
        self.jobs.len()
    }

    /// Earliest allocation start.
    pub fn earliest_start(&self) -> Option<NaiveDateTime> {
        self.allocations.iter().map(|a| a.start).min()
    }

    /// Latest allocation end.
    pub fn latest_end(&self) -> Option<NaiveDateTime> {
        self.allocations.iter().map(|a| a.end).max()
    }

    /// Makespan: latest end minus earliest start (minutes). 0 when empty.
    pub fn makespan_mins(&self) -> f64 {
        match (self.earliest_start(), self.latest_end()) {
            (Some(s), Some(e)) => (e - s).num_milliseconds() as f64 / 60_000.0,
            _ => 0.0,
        }
    }

    /// Finds a placed job.
    pub fn job(&self, job_id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == job_id)
    }

    /// Finds the allocation of a job.
    pub fn allocation_for_job(&self, job_id: &str) -> Option<&EquipmentAllocation> {
        self.allocations.iter().find(|a| a.job_id == job_id)
    }

    /// Returns all allocations on one equipment.
    pub fn allocations_for_equipment(&self, equipment_id: &str) -> Vec<&EquipmentAllocation> {
        self.allocations
            .iter()
            .filter(|a| a.equipment_id == equipment_id)
            .collect()
    }

    /// Cumulative allocated minutes per equipment.
    pub fn load_by_equipment(&self) -> BTreeMap<String, f64> {
        let mut load: BTreeMap<String, f64> = BTreeMap::new();
        for a in &self.allocations {
            *load.entry(a.equipment_id.clone()).or_insert(0.0) += a.duration_mins();
        }
        load
    }

    /// Pairs of allocations that overlap on the same equipment.
    pub fn conflicts(&self) -> Vec<(&EquipmentAllocation, &EquipmentAllocation)> {
        let mut out = Vec::new();
        for (i, a) in self.allocations.iter().enumerate() {
            for b in &self.allocations[i + 1..] {
                if a.conflicts_with(b) {
                    out.push((a, b));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn shift() -> Shift {
        Shift::new(
            "day",
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        )
    }

    fn alloc(eq: &str, job: &str, start: NaiveDateTime, end: NaiveDateTime) -> EquipmentAllocation {
        EquipmentAllocation {
            equipment_id: eq.into(),
            job_id: job.into(),
            start,
            end,
            utilization_percentage: 100.0,
        }
    }

    fn sample_schedule() -> ProductionSchedule {
        let mut s = ProductionSchedule::new("P1", shift(), day(), Algorithm::Fifo);
        s.allocations.push(alloc("M1", "J1", at(6, 0), at(7, 0)));
        s.allocations.push(alloc("M2", "J2", at(6, 30), at(7, 0)));
        s.allocations.push(alloc("M1", "J3", at(7, 0), at(8, 30)));
        s
    }

    #[test]
    fn test_makespan() {
        let s = sample_schedule();
        assert!((s.makespan_mins() - 150.0).abs() < 1e-9);
        assert_eq!(s.earliest_start(), Some(at(6, 0)));
        assert_eq!(s.latest_end(), Some(at(8, 30)));
    }

    #[test]
    fn test_empty_schedule() {
        let s = ProductionSchedule::new("P1", shift(), day(), Algorithm::Fifo);
        assert!(s.is_empty());
        assert_eq!(s.placed_count(), 0);
        assert!((s.makespan_mins() - 0.0).abs() < 1e-9);
        assert!(s.load_by_equipment().is_empty());
    }

    #[test]
    fn test_load_by_equipment() {
        let load = sample_schedule().load_by_equipment();
        assert!((load["M1"] - 150.0).abs() < 1e-9);
        assert!((load["M2"] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_allocations_for_equipment() {
        let s = sample_schedule();
        assert_eq!(s.allocations_for_equipment("M1").len(), 2);
        assert_eq!(s.allocation_for_job("J2").unwrap().equipment_id, "M2");
        assert!(s.allocation_for_job("J9").is_none());
    }

    #[test]
    fn test_conflicts() {
        let mut s = sample_schedule();
        assert!(s.conflicts().is_empty()); // touching intervals do not conflict

        s.allocations.push(alloc("M1", "J4", at(8, 0), at(9, 0)));
        let conflicts = s.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].0.job_id, "J3");
        assert_eq!(conflicts[0].1.job_id, "J4");
    }

    #[test]
    fn test_id_is_deterministic() {
        let a = ProductionSchedule::new("P1", shift(), day(), Algorithm::Fifo);
        let b = ProductionSchedule::new("P1", shift(), day(), Algorithm::Fifo);
        let c = ProductionSchedule::new("P1", shift(), day(), Algorithm::EarliestDueDate);
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_serde_round_trip() {
        let s = sample_schedule();
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"algorithm\":\"fifo\""));
        let back: ProductionSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!(Algorithm::ALL.len(), 7);
        assert_eq!(Algorithm::CriticalRatio.name(), "CR");
        assert!(Algorithm::ConstraintSatisfaction.is_deterministic());
        assert!(!Algorithm::Genetic.is_deterministic());
    }
}
