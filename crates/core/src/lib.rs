//! # skein-core
//!
//! Domain types, traits, and error definitions for the skein agent runtime.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that the loop and tool crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here: the completion
//! backend, individual tools, and the component prop catalog. Implementations
//! live in their respective crates (or in the host application). This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod component;
pub mod content;
pub mod error;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use backend::{CompletionBackend, CompletionRequest, CompletionResponse};
pub use component::{ComponentCatalog, StaticCatalog};
pub use content::ContentItem;
pub use error::{BackendError, ContentError, Error, Result, ToolError};
pub use message::{Message, Role};
pub use tool::{Tool, ToolDefinition, ToolRegistry};
