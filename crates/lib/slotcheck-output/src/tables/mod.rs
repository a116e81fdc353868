pub mod energy;
pub mod summary;
pub mod trials;
