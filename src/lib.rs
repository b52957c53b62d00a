//! Personal activity tracker for the terminal. Entries for food, fitness, consumption and notes are
//! logged with a timestamp, browsed day by day and counted over time ranges.
//!

pub mod analytics;
pub mod cli;
pub mod history;
pub mod state;
pub mod storage;
pub mod utils;
