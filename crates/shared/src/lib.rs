//! Shared utilities and common types for the wedding sites backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Hashing and submission fingerprints
//! - JWT access-token verification
//! - Common validation logic
//! - Serde helpers for date/time form fields

pub mod crypto;
pub mod datetime;
pub mod jwt;
pub mod validation;
