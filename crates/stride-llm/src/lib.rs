//! # stride-llm
//!
//! One call surface over several LLM backends: send a system prompt, a user
//! prompt and a JSON Schema, get back a JSON value that has already been
//! validated against that schema.
//!
//! | backend   | structured-output mechanism                                  |
//! |-----------|--------------------------------------------------------------|
//! | Anthropic | forced tool call whose `input_schema` is the request schema  |
//! | OpenAI    | `response_format: json_schema` with `strict: true`           |
//! | Gemini    | `responseMimeType: application/json`, schema in the prompt   |
//!
//! [`ProviderFactory`] maps a [`stride_core::enums::ProviderKind`] plus a
//! resolved API key to a boxed [`StructuredModel`].

mod anthropic;
mod error;
mod factory;
mod gemini;
mod openai;
mod provider;

pub use anthropic::AnthropicModel;
pub use error::ProviderError;
pub use factory::{HttpProviderFactory, ProviderFactory};
pub use gemini::GeminiModel;
pub use openai::OpenAiModel;
pub use provider::{ModelSettings, StructuredModel, extract_json, parse_http_error};
