//! # stride-core
//!
//! Core types, ID generation prefixes, and error types for Stride.
//!
//! This crate provides the foundational types shared across all Stride crates:
//! - Entity structs for journal entries, interpretations, daily activity, goals and phases
//! - Ordinal signal enums (activity level, momentum) and the provider selector
//! - ID prefix constants
//! - Read shapes returned by the journal
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
