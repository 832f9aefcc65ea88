//! Entity structs for all Stride domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation.

mod activity;
mod entry;
mod goal;
mod interpretation;

pub use activity::{DailyActivityRecord, utc_day};
pub use entry::Entry;
pub use goal::{ActiveGoal, Goal, Phase};
pub use interpretation::{Interpretation, Reframe};
