// driftwatch/src/commands/mod.rs

pub mod analyze;
pub mod inspect;
pub mod run;
