//! Design-time code generation.
//!
//! Renders the parsed operation index into a Rust source file of typed,
//! documented async method stubs, one per included operation.

pub mod emitter;

pub use emitter::Generator;
