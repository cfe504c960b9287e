//! Transcript ingestion and identity verification for the student advising service.
//!
//! [`transcript::parse_transcript`] turns extracted transcript text into a
//! deduplicated course list, and [`verify::verify_identity`] decides whether
//! the document belongs to the profile that uploaded it. The remaining
//! modules wire both into an HTTP service with SQLite-backed profiles.

pub mod config;
pub mod db;
pub mod server;
pub mod transcript;
pub mod types;
pub mod verify;
