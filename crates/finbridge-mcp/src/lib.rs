//! MCP server exposing the tool registry over stdio.
//!
//! This crate provides MCP support using the official rmcp Rust SDK.

pub mod server;

pub use server::{serve_stdio, FinbridgeServer};
