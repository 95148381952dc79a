pub mod error;
pub mod streamrelay;
