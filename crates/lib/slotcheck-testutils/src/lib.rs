pub mod field;
pub mod stream;
