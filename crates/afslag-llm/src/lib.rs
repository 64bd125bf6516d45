//! Afslag LLM - Provider abstraction for buyer decision backends
//!
//! Buyer agents can delegate their buy/wait decisions to a language model.
//! This crate is the seam that makes that optional:
//!
//! - OpenAI-compatible: vLLM, llama.cpp, any `/chat/completions` server
//! - Scripted: canned replies for tests, no network
//!
//! ## Key Design Principles
//!
//! 1. LLMs may **suggest** bids, never place them
//! 2. All LLM output is validated before any bid is derived from it
//! 3. No provider configured means no LLM involvement at all
//! 4. JSON-mode for structured outputs

pub mod providers;
pub mod router;
pub mod types;

pub use providers::*;
pub use router::*;
pub use types::*;
