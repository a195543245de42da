//! Simple to use terminal tap counter. Taps are tallied per calendar day,
//! aggregated into weekly and monthly views, optionally converted into a
//! secondary unit (steps, reps, ...), and exported/imported as JSON backups.
//!

pub mod app;
pub mod cli;
pub mod core;
pub mod session;
pub mod storage;
pub mod utils;
