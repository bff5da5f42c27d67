//! Craftline Core - Shared types library.
//!
//! This crate provides common types used across the Craftline components:
//! - `admin` - Administration API backend for the Indikriti and Winsome Lane
//!   storefronts
//! - `cli` - Command-line tools for migrations, seeding, and backups
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, brands, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
