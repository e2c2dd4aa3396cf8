//! Core domain types and logic.

pub mod error;
pub mod filter;
pub mod query;
pub mod repository;
pub mod trade;
