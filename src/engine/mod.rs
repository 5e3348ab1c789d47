//! Attendance rules: time normalization, working-day calendar, status
//! classification, worked hours, and the per-date view session.

pub mod calendar;
pub mod classifier;
pub mod controller;
pub mod duration;
pub mod error;
pub mod time;
