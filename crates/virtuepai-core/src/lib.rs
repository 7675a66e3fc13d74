//! Core library for `VirtuePAI`.
//!
//! Contains the credential codec used to keep the mail password encrypted in
//! configuration, the mail transport configuration derived from it, and the
//! keyword classifier that produces canned replies when the upstream chat
//! model is unavailable. Nothing in this crate reads the process environment
//! or performs network I/O.

pub mod crypto;
pub mod error;
pub mod fallback;
pub mod mail;
