#![forbid(unsafe_code)]

pub mod error;
pub mod runlog;
pub mod topology;
