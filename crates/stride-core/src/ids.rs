//! ID prefixes for generated entity identifiers.
//!
//! Generated IDs have the form `{prefix}-{8 hex chars}`, e.g. `ent-a3f8b2c1`.
//! Entries created with a client idempotency key use the key verbatim instead.

pub const PREFIX_ENTRY: &str = "ent";
pub const PREFIX_INTERPRETATION: &str = "int";
pub const PREFIX_GOAL: &str = "gol";
pub const PREFIX_PHASE: &str = "phs";

/// Every prefix the database layer may be asked to generate.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_ENTRY,
    PREFIX_INTERPRETATION,
    PREFIX_GOAL,
    PREFIX_PHASE,
];
