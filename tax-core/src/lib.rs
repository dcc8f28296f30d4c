pub mod analysis;
pub mod calculations;
pub mod models;
pub mod tables;

pub use models::*;
