//! Ordinal signals, classification enums, and the provider selector.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage. The ordinal enums derive `Ord` in
//! declaration order, so `ActivityLevel::None < ActivityLevel::Partial <
//! ActivityLevel::Full` holds directly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// ActivityLevel
// ---------------------------------------------------------------------------

/// Detected activity for one goal on one day.
///
/// ```text
/// none(0) < partial(1) < full(2)
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    None,
    Partial,
    Full,
}

impl ActivityLevel {
    pub const ALL: [Self; 3] = [Self::None, Self::Partial, Self::Full];

    /// Ordinal rank used by the daily aggregation guard.
    #[must_use]
    pub const fn rank(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Partial => 1,
            Self::Full => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }

    #[must_use]
    pub const fn is_detected(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MomentumSignal
// ---------------------------------------------------------------------------

/// Overall engagement signal for one interpretation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MomentumSignal {
    None,
    Low,
    Medium,
    High,
}

impl MomentumSignal {
    pub const ALL: [Self; 4] = [Self::None, Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for MomentumSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReframeKind
// ---------------------------------------------------------------------------

/// Kind of goal-level reconsideration suggested by an interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReframeKind {
    /// The goal is sized wrong for the user's current capacity.
    Resize,
    /// The goal should be put on hold for now.
    Pause,
    /// The goal no longer matters and should be dropped.
    Retire,
    /// The goal is pointed at the wrong outcome and needs restating.
    Redefine,
}

impl ReframeKind {
    pub const ALL: [Self; 4] = [Self::Resize, Self::Pause, Self::Retire, Self::Redefine];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resize => "resize",
            Self::Pause => "pause",
            Self::Retire => "retire",
            Self::Redefine => "redefine",
        }
    }

    /// One-line explanation used when describing the kinds to a model.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Resize => "the goal is too big or too small for current capacity",
            Self::Pause => "the goal should be deliberately put on hold",
            Self::Retire => "the goal no longer serves the user and should be dropped",
            Self::Redefine => "the goal targets the wrong outcome and should be restated",
        }
    }
}

impl fmt::Display for ReframeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PhaseIntensity
// ---------------------------------------------------------------------------

/// Expected effort during a goal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhaseIntensity {
    Light,
    Steady,
    Intense,
}

impl PhaseIntensity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Steady => "steady",
            Self::Intense => "intense",
        }
    }
}

impl fmt::Display for PhaseIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProviderKind
// ---------------------------------------------------------------------------

/// LLM backend used to analyze entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [Self; 3] = [Self::Anthropic, Self::OpenAi, Self::Gemini];

    /// Backend used when neither the caller, the user settings, nor the
    /// config file name one.
    pub const FALLBACK: Self = Self::Anthropic;

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    /// Conventional environment variable holding this backend's API key.
    #[must_use]
    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "open_ai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(CoreError::Validation(format!("unknown provider '{other}'"))),
        }
    }
}
