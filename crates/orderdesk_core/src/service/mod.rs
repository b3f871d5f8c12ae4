//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the cross-entity rules repositories do not know about.

pub mod order_service;
pub mod report;
