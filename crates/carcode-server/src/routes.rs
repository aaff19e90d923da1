//! HTTP routes

pub mod downloads;
pub mod generate;
pub mod vehicles;
