//! Pipeline stages for PDF-to-HTML conversion.
//!
//! Each submodule implements exactly one step so it can be tested alone.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ validate ──▶ converter ──▶ assemble
//! (HTTP GET)  (%PDF sniff)  (pdf2htmlEX)  (single file | page-N.html list)
//! ```
//!
//! 1. [`fetch`]     — stream the remote PDF into the workspace
//! 2. [`validate`]  — reject files that do not start with `%PDF`
//! 3. [`converter`] — run the external converter with the fixed flag set
//! 4. [`assemble`]  — read back the single output or the ordered page fragments
//!
//! Admission control and workspace lifetime wrap these stages in
//! [`crate::convert`].

pub mod assemble;
pub mod converter;
pub mod fetch;
pub mod validate;
