//! Work-breakdown-structure progress tracking.
//!
//! Flat schedule exports become a task tree keyed by WBS code, parent
//! progress is rolled up from weighted subtasks, and the tree is analyzed
//! into an S-curve, a status histogram, delay totals and the next critical
//! activity.

pub mod cli;
pub mod commands;
pub mod shared;
