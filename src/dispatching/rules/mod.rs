//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Arrival**: FIFO
//! - **Time-based**: SPT
//! - **Due-date**: EDD, CR
//!
//! # Convention
//! All rules sort ascending: the job compared `Less` is dispatched first.
//! Jobs without a due time sort after every job that has one.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;

use super::{by_score, DispatchContext, DispatchingRule, RuleScore};
use crate::models::Job;

// ======================== Arrival rules ========================

/// First In First Out.
///
/// Work order IDs are issued in arrival order, so their lexicographic
/// order stands in for arrival time.
#[derive(Debug, Clone, Copy)]
pub struct Fifo;

impl DispatchingRule for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn compare(&self, a: &Job, b: &Job, _context: &DispatchContext) -> Ordering {
        a.work_order_id.cmp(&b.work_order_id)
    }

    fn description(&self) -> &'static str {
        "First In First Out"
    }
}

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// Key: quantity x cycle time (setup excluded).
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl Spt {
    /// Processing seconds of a job.
    pub fn score(job: &Job) -> RuleScore {
        job.quantity as f64 * job.cycle_time_secs
    }
}

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn compare(&self, a: &Job, b: &Job, _context: &DispatchContext) -> Ordering {
        by_score(Self::score(a), Self::score(b))
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

// ======================== Due-date rules ========================

/// Earliest Due Date.
///
/// # Reference
/// Jackson (1955), optimal for minimizing maximum lateness on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn compare(&self, a: &Job, b: &Job, _context: &DispatchContext) -> Ordering {
        match (a.due_time, b.due_time) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    fn description(&self) -> &'static str {
        "Earliest Due Date"
    }
}

/// Critical Ratio.
///
/// CR = (due - now) in hours / (quantity x cycle time) in hours.
/// - CR < 1.0: behind schedule
/// - CR = 1.0: on track
/// - CR > 1.0: ahead of schedule
///
/// Jobs with no remaining work or no due time get +inf and go last.
#[derive(Debug, Clone, Copy)]
pub struct Cr;

impl Cr {
    /// Critical ratio of a job at `context.now`.
    pub fn score(job: &Job, context: &DispatchContext) -> RuleScore {
        let due = match job.due_time {
            Some(d) => d,
            None => return f64::INFINITY,
        };

        let work_hours = job.quantity as f64 * job.cycle_time_secs / 3600.0;
        if work_hours <= 0.0 {
            return f64::INFINITY;
        }

        let time_remaining_hours = (due - context.now).num_milliseconds() as f64 / 3_600_000.0;
        time_remaining_hours / work_hours
    }
}

impl DispatchingRule for Cr {
    fn name(&self) -> &'static str {
        "CR"
    }

    fn compare(&self, a: &Job, b: &Job, context: &DispatchContext) -> Ordering {
        by_score(Self::score(a, context), Self::score(b, context))
    }

    fn description(&self) -> &'static str {
        "Critical Ratio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn make_job(id: &str, units: u32, cycle: f64, due: Option<NaiveDateTime>) -> Job {
        let mut job = Job::new(id, format!("WO-{id}")).with_work(units, cycle);
        job.due_time = due;
        job
    }

    #[test]
    fn test_fifo_by_work_order() {
        let ctx = DispatchContext::at(at(6));
        let first = Job::new("x", "WO-0001").with_work(1, 1.0);
        let second = Job::new("a", "WO-0002").with_work(1, 1.0);
        assert_eq!(Fifo.compare(&first, &second, &ctx), Ordering::Less);
        assert_eq!(Fifo.compare(&second, &first, &ctx), Ordering::Greater);
    }

    #[test]
    fn test_fifo_is_string_order() {
        // "WO-10" < "WO-9" lexicographically
        let ctx = DispatchContext::at(at(6));
        let ten = Job::new("a", "WO-10").with_work(1, 1.0);
        let nine = Job::new("b", "WO-9").with_work(1, 1.0);
        assert_eq!(Fifo.compare(&ten, &nine, &ctx), Ordering::Less);
    }

    #[test]
    fn test_spt() {
        let ctx = DispatchContext::at(at(6));
        let short = make_job("short", 10, 30.0, None);
        let long = make_job("long", 10, 90.0, None);
        assert!((Spt::score(&short) - 300.0).abs() < 1e-9);
        assert_eq!(Spt.compare(&short, &long, &ctx), Ordering::Less);
    }

    #[test]
    fn test_spt_ignores_setup() {
        let ctx = DispatchContext::at(at(6));
        let big_setup = make_job("a", 10, 30.0, None).with_setup(120.0);
        let no_setup = make_job("b", 20, 30.0, None);
        assert_eq!(Spt.compare(&big_setup, &no_setup, &ctx), Ordering::Less);
    }

    #[test]
    fn test_edd() {
        let ctx = DispatchContext::at(at(6));
        let early = make_job("early", 1, 1.0, Some(at(8)));
        let late = make_job("late", 1, 1.0, Some(at(12)));
        let none = make_job("none", 1, 1.0, None);
        assert_eq!(Edd.compare(&early, &late, &ctx), Ordering::Less);
        assert_eq!(Edd.compare(&late, &none, &ctx), Ordering::Less);
        assert_eq!(Edd.compare(&none, &none, &ctx), Ordering::Equal);
    }

    #[test]
    fn test_cr_values() {
        let ctx = DispatchContext::at(at(6));
        // 2 h of work, due in 4 h -> CR = 2.0
        let job = make_job("J", 120, 60.0, Some(at(10)));
        assert!((Cr::score(&job, &ctx) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_cr_behind_schedule() {
        let ctx = DispatchContext::at(at(12));
        // Due 2 h ago -> negative ratio, dispatched before on-track work
        let behind = make_job("behind", 60, 60.0, Some(at(10)));
        let normal = make_job("normal", 60, 60.0, Some(at(20)));
        assert!(Cr::score(&behind, &ctx) < 0.0);
        assert_eq!(Cr.compare(&behind, &normal, &ctx), Ordering::Less);
    }

    #[test]
    fn test_cr_zero_work_sorts_last() {
        let ctx = DispatchContext::at(at(6));
        let zero = make_job("zero", 0, 60.0, Some(at(7)));
        let normal = make_job("normal", 600, 60.0, Some(at(20)));
        assert!(Cr::score(&zero, &ctx).is_infinite());
        assert_eq!(Cr.compare(&normal, &zero, &ctx), Ordering::Less);
    }

    #[test]
    fn test_cr_no_due_sorts_last() {
        let ctx = DispatchContext::at(at(6));
        let none = make_job("none", 10, 60.0, None);
        let due = make_job("due", 10, 60.0, Some(at(22)));
        assert_eq!(Cr.compare(&due, &none, &ctx), Ordering::Less);
    }

    #[test]
    fn test_cr_can_reverse_edd() {
        // A is due first but has little work; B is due later with lots of work.
        let ctx = DispatchContext::at(at(6));
        let a = make_job("A", 60, 60.0, Some(at(10))); // 1 h work, 4 h left -> 4.0
        let b = make_job("B", 300, 60.0, Some(at(12))); // 5 h work, 6 h left -> 1.2
        assert_eq!(Edd.compare(&a, &b, &ctx), Ordering::Less);
        assert_eq!(Cr.compare(&a, &b, &ctx), Ordering::Greater);
    }
}
