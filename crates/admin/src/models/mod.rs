//! Domain models for the admin backend.

pub mod hierarchy;

pub use hierarchy::{Category, CategoryNode, ProductType, Subcategory, SubcategoryNode};
