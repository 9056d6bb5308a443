//! Reshaping raw tables into typed, filtered observation tables.

pub mod dates;
pub mod error;
pub mod filters;
pub mod normalizer;
mod typing;
