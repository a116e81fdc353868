#![forbid(unsafe_code)]

pub mod aggregate;
pub mod error;
pub mod predicate;
pub mod ratio;
pub mod run;
pub mod stats;
