#![forbid(unsafe_code)]

pub use arrow;

pub mod error;
pub mod logger;
pub mod result;
pub mod tables;
