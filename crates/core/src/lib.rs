//! # Reagent Core
//!
//! Domain types, traits, and error definitions for the reagent control loop.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The loop crates depend only on the traits defined here:
//! - [`Provider`] abstracts the language-model backend
//! - [`Tool`] + [`ToolRegistry`] abstract the agent's capabilities
//!
//! Implementations live in their own crates, which keeps the control loop
//! testable with scripted mocks and free of transport concerns.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod trajectory;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use message::{Message, Role};
pub use provider::{GenerateRequest, Generation, Provider, Usage};
pub use tool::{FnTool, Tool, ToolInput, ToolRegistry};
pub use trajectory::{Step, StepKind, Trajectory};
