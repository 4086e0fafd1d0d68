//! # CareerLens Core
//!
//! Domain types, traits, and error definitions for CareerLens.
//! This crate has **no framework dependencies**: it defines the domain model
//! that the store, generator, and gateway crates implement against.
//!
//! The two seams are traits:
//! - [`ReflectionStore`] for the durable question/answer log
//! - [`Generator`] for the external text-generation service

pub mod error;
pub mod locale;
pub mod memory;
pub mod provider;
pub mod reflection;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GenerationError, Result, StoreError};
pub use locale::Locale;
pub use memory::ReflectionStore;
pub use provider::{GenerationRequest, GenerationResult, Generator, PromptMode, RequestKind};
pub use reflection::{NewReflection, Reflection};
