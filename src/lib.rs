//! FTE workload reports over a course roster: loading the source tables,
//! aggregating Generated FTE by division, instructor or course, and
//! rendering the results for export.
pub mod config;
pub mod error;
pub mod fte;
pub mod loader;
pub mod naming;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
