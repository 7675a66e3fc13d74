//! `VirtuePAI` HTTP server.
//!
//! Wires the core library, the upstream chat-completion client, and SMTP
//! delivery into an Axum server exposing the `/api/*` endpoints used by the
//! marketing site.

pub mod config;
pub mod error;
pub mod mailer;
pub mod proxy;
pub mod routes;
pub mod state;
pub mod upstream;
