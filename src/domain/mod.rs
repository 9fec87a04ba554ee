pub mod models;
pub mod planner;
pub mod schedule;
pub mod time;
