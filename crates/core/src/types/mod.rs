//! Core types for Craftline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod brand;
pub mod email;
pub mod id;
pub mod slug;
pub mod status;

pub use brand::{Brand, BrandParseError};
pub use email::{Email, EmailError};
pub use id::*;
pub use slug::slugify;
pub use status::*;
