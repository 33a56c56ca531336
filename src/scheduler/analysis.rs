//! Post-hoc schedule analysis.
//!
//! Computes performance indicators from any finished
//! [`ProductionSchedule`], independent of the strategy that produced it.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan | Latest end - earliest start |
//! | On-Time % | Placed jobs with end <= due (no due = on time) |
//! | Total / Max Tardiness | Sum / max of max(0, end - due) |
//! | Load | Cumulative allocated minutes per equipment |
//! | Utilization | Load / makespan per equipment |
//! | Bottlenecks | Equipment with load > 1.5 x mean load |
//! | Shift Capacity | Allocated minutes / (productive shift minutes x equipment used) |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::BTreeMap;

use crate::models::ProductionSchedule;

/// Load factor above the mean that marks a bottleneck.
pub const BOTTLENECK_FACTOR: f64 = 1.5;

/// Schedule performance indicators.
///
/// Time values are in minutes, ratios in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleAnalysis {
    /// Latest end minus earliest start.
    pub makespan_mins: f64,
    /// Share of placed jobs finishing on time (0..100).
    pub on_time_percentage: f64,
    /// Sum of tardiness across placed jobs.
    pub total_tardiness_mins: f64,
    /// Largest single tardiness.
    pub max_tardiness_mins: f64,
    /// Cumulative allocated minutes per equipment.
    pub load_by_equipment: BTreeMap<String, f64>,
    /// Load over makespan per equipment (0..100).
    pub utilization_by_equipment: BTreeMap<String, f64>,
    /// Mean of `utilization_by_equipment`.
    pub avg_utilization: f64,
    /// Equipment loaded above [`BOTTLENECK_FACTOR`] x mean load.
    pub bottlenecks: Vec<String>,
    /// Allocated minutes over productive shift capacity (0..100+).
    pub shift_capacity_utilization: f64,
}

impl ScheduleAnalysis {
    /// Analyzes a finished schedule.
    ///
    /// Shift capacity counts the equipment that received allocations.
    pub fn calculate(schedule: &ProductionSchedule) -> Self {
        let makespan_mins = schedule.makespan_mins();

        let mut total_tardiness: f64 = 0.0;
        let mut max_tardiness: f64 = 0.0;
        let mut on_time_count: usize = 0;
        for job in &schedule.jobs {
            let tardiness = job.tardiness_mins();
            if tardiness > 0.0 {
                total_tardiness += tardiness;
                max_tardiness = max_tardiness.max(tardiness);
            } else {
                on_time_count += 1;
            }
        }

        let on_time_percentage = if schedule.jobs.is_empty() {
            100.0
        } else {
            on_time_count as f64 / schedule.jobs.len() as f64 * 100.0
        };

        let load_by_equipment = schedule.load_by_equipment();
        let utilization_by_equipment: BTreeMap<String, f64> = load_by_equipment
            .iter()
            .map(|(id, load)| {
                let u = if makespan_mins > 0.0 {
                    load / makespan_mins * 100.0
                } else {
                    0.0
                };
                (id.clone(), u)
            })
            .collect();
        let avg_utilization = mean(utilization_by_equipment.values().copied());

        let mean_load = mean(load_by_equipment.values().copied());
        let bottlenecks = load_by_equipment
            .iter()
            .filter(|&(_, &load)| load > mean_load * BOTTLENECK_FACTOR)
            .map(|(id, _)| id.clone())
            .collect();

        let allocated: f64 = load_by_equipment.values().sum();
        let shift_mins = schedule.shift.productive_ms() as f64 / 60_000.0;
        let capacity = shift_mins * load_by_equipment.len() as f64;
        let shift_capacity_utilization = if capacity > 0.0 {
            allocated / capacity * 100.0
        } else {
            0.0
        };

        Self {
            makespan_mins,
            on_time_percentage,
            total_tardiness_mins: total_tardiness,
            max_tardiness_mins: max_tardiness,
            load_by_equipment,
            utilization_by_equipment,
            avg_utilization,
            bottlenecks,
            shift_capacity_utilization,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_tardiness_mins: f64, min_utilization: f64) -> bool {
        self.max_tardiness_mins <= max_tardiness_mins && self.avg_utilization >= min_utilization
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Algorithm, EquipmentAllocation, Job, Shift};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn shift() -> Shift {
        Shift::new(
            "day",
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        )
        .with_break(
            "lunch",
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        )
    }

    fn schedule() -> ProductionSchedule {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        ProductionSchedule::new("P1", shift(), date, Algorithm::Fifo)
    }

    fn place(
        s: &mut ProductionSchedule,
        id: &str,
        eq: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        due: Option<NaiveDateTime>,
    ) {
        let mut job = Job::new(id, format!("WO-{id}")).with_work(1, 60.0);
        job.due_time = due;
        s.jobs.push(job.placed(eq, start, end));
        s.allocations.push(EquipmentAllocation {
            equipment_id: eq.into(),
            job_id: id.into(),
            start,
            end,
            utilization_percentage: 100.0,
        });
    }

    #[test]
    fn test_analysis_basic() {
        let mut s = schedule();
        place(&mut s, "J1", "M1", at(6, 0), at(7, 0), Some(at(8, 0)));
        place(&mut s, "J2", "M1", at(7, 0), at(9, 0), Some(at(8, 0))); // 60 min late
        place(&mut s, "J3", "M2", at(6, 0), at(7, 0), None);

        let a = ScheduleAnalysis::calculate(&s);
        assert!((a.makespan_mins - 180.0).abs() < 1e-10);
        assert!((a.on_time_percentage - 200.0 / 3.0).abs() < 1e-10);
        assert!((a.total_tardiness_mins - 60.0).abs() < 1e-10);
        assert!((a.max_tardiness_mins - 60.0).abs() < 1e-10);
        assert!((a.load_by_equipment["M1"] - 180.0).abs() < 1e-10);
        assert!((a.utilization_by_equipment["M1"] - 100.0).abs() < 1e-10);
        assert!((a.utilization_by_equipment["M2"] - 100.0 / 3.0).abs() < 1e-10);
        assert!((a.avg_utilization - 200.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_bottleneck_detection() {
        let mut s = schedule();
        // M1: 300 min, M2/M3: 30 min each -> mean 120, threshold 180
        place(&mut s, "J1", "M1", at(6, 0), at(11, 0), None);
        place(&mut s, "J2", "M2", at(6, 0), at(6, 30), None);
        place(&mut s, "J3", "M3", at(6, 0), at(6, 30), None);

        let a = ScheduleAnalysis::calculate(&s);
        assert_eq!(a.bottlenecks, vec!["M1".to_string()]);
    }

    #[test]
    fn test_balanced_has_no_bottleneck() {
        let mut s = schedule();
        place(&mut s, "J1", "M1", at(6, 0), at(7, 0), None);
        place(&mut s, "J2", "M2", at(6, 0), at(7, 0), None);
        assert!(ScheduleAnalysis::calculate(&s).bottlenecks.is_empty());
    }

    #[test]
    fn test_shift_capacity_excludes_breaks() {
        let mut s = schedule();
        // Productive shift: 8 h - 30 min = 450 min, one equipment
        place(&mut s, "J1", "M1", at(6, 0), at(9, 45), None);
        let a = ScheduleAnalysis::calculate(&s);
        assert!((a.shift_capacity_utilization - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_analysis_empty() {
        let a = ScheduleAnalysis::calculate(&schedule());
        assert_eq!(a.makespan_mins, 0.0);
        assert!((a.on_time_percentage - 100.0).abs() < 1e-10);
        assert!(a.bottlenecks.is_empty());
        assert_eq!(a.avg_utilization, 0.0);
        assert_eq!(a.shift_capacity_utilization, 0.0);
    }

    #[test]
    fn test_meets_thresholds() {
        let mut s = schedule();
        place(&mut s, "J1", "M1", at(6, 0), at(7, 0), Some(at(6, 30)));
        let a = ScheduleAnalysis::calculate(&s);
        assert!(a.meets_thresholds(30.0, 50.0));
        assert!(!a.meets_thresholds(29.0, 0.0));
        assert!(!a.meets_thresholds(60.0, 101.0));
    }
}
