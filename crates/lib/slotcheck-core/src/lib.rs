#![forbid(unsafe_code)]

pub use hashbrown;

pub mod clock;
pub mod error;
pub mod event;
pub mod latest;
pub mod mote;
pub mod neighbours;
pub mod run;
