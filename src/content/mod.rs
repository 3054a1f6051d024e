//! LLM-backed marketing and analysis content.

pub mod client;
pub mod generator;
pub mod prompts;

pub use client::{GeminiClient, LanguageModel};
pub use generator::{AdvancedInputs, ContentGenerator, ContentSections};
