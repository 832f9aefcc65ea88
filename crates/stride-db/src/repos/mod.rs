//! Repository modules. Each adds methods to `StrideService` via
//! `impl StrideService` blocks.

pub mod daily_activity;
pub mod entries;
pub mod goals;
pub mod interpretations;
pub mod settings;
