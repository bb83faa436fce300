//! HTTP API for AI-assisted English practice.
//!
//! Six JSON endpoints validate their input, build a prompt (plain text, chat
//! turn, or text plus inline audio), issue one call to Gemini's
//! `generateContent` API, and wrap the returned text in a uniform
//! `{success, data?, error?}` envelope.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod services;
pub mod startup;
