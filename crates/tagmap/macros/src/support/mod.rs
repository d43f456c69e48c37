//! Internal support utilities for the derive.
//!
//! Attribute parsing, diagnostics, and struct shape checks live here so the
//! derive itself only deals with code generation.

pub mod attrs;
pub mod diag;
pub mod utils;
