//! Common library for the staff-management and inventory services
//!
//! This crate provides the shared infrastructure used by both services:
//! PostgreSQL connection pooling, health checks, and common error types.

pub mod database;
pub mod error;
