//! Finite-capacity production scheduling.
//!
//! Assigns jobs to equipment and time slots within a shift, respecting
//! equipment status and time-overlap, and scores the result. Seven
//! interchangeable strategies produce the same [`ProductionSchedule`]
//! output.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Job`, `Equipment`, `Shift`,
//!   `SchedulingConstraint`, `ProductionSchedule`, `EquipmentAllocation`
//! - **`validation`**: Input integrity checks and eligibility filtering
//! - **`dispatching`**: Priority rules (FIFO, SPT, EDD, CR) and a composable rule engine
//! - **`ga`**: Permutation genetic algorithm
//! - **`sa`**: Permutation simulated annealing
//! - **`cp`**: Backtracking constraint-satisfaction solver over time slots
//! - **`scheduler`**: Generation facade, allocation engine, scoring and analysis
//! - **`config`**, **`error`**, **`cancel`**: Configuration, error types, cooperative cancellation
//!
//! # Usage
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime};
//! use prod_schedule::models::{Algorithm, Equipment, Job, Shift};
//! use prod_schedule::scheduler::ScheduleAnalysis;
//! use prod_schedule::{ProductionScheduler, ScheduleRequest, SchedulerConfig};
//!
//! let shift = Shift::new(
//!     "day",
//!     NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
//!     NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
//! );
//! let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let request = ScheduleRequest::new("P1", shift, date)
//!     .with_jobs(vec![
//!         Job::new("J1", "WO-1").with_work(10, 60.0),
//!         Job::new("J2", "WO-2").with_work(20, 30.0),
//!     ])
//!     .with_equipment(vec![Equipment::new("M1")]);
//!
//! let scheduler = ProductionScheduler::new(SchedulerConfig::default().with_seed(7));
//! let schedule = scheduler.generate(Algorithm::Genetic, &request).unwrap();
//! assert_eq!(schedule.placed_count(), 2);
//!
//! let analysis = ScheduleAnalysis::calculate(&schedule);
//! assert!((analysis.makespan_mins - 20.0).abs() < 1e-9);
//! ```
//!
//! # Logging
//!
//! Emits `tracing` events; install a subscriber to see them.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6

pub mod cancel;
pub mod config;
pub mod cp;
pub mod dispatching;
pub mod error;
pub mod ga;
pub mod models;
pub mod sa;
pub mod scheduler;
pub mod validation;

#[cfg(test)]
pub(crate) mod log_capture;

pub use cancel::CancelToken;
pub use config::SchedulerConfig;
pub use error::{Result, SchedulingError};
pub use models::{Algorithm, ProductionSchedule};
pub use scheduler::{GenerateOptions, ProductionScheduler, ScheduleRequest};
