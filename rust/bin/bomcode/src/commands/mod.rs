pub mod config;
pub mod counters;
pub mod run;
