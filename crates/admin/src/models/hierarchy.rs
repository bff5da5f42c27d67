//! Brand category hierarchy domain models.
//!
//! Each brand carries its own three-level merchandising tree:
//! category -> subcategory -> product type. The trees are fully separate;
//! a subcategory can never hang off another brand's category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use craftline_core::{Brand, CategoryId, ProductTypeId, SubcategoryId};

/// A top-level category within a brand's tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Brand the category belongs to.
    pub brand: Brand,
    /// Display name.
    pub name: String,
    /// URL slug, unique within the brand.
    pub slug: String,
    /// Ordering within the brand (ascending).
    pub sort_order: i32,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A subcategory under a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    /// Unique subcategory ID.
    pub id: SubcategoryId,
    /// Parent category.
    pub category_id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug, unique within the parent category.
    pub slug: String,
    /// Ordering within the parent (ascending).
    pub sort_order: i32,
    /// When the subcategory was created.
    pub created_at: DateTime<Utc>,
}

/// A product type under a subcategory (leaf of the tree).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductType {
    /// Unique product type ID.
    pub id: ProductTypeId,
    /// Parent subcategory.
    pub subcategory_id: SubcategoryId,
    /// Display name.
    pub name: String,
    /// URL slug, unique within the parent subcategory.
    pub slug: String,
    /// Ordering within the parent (ascending).
    pub sort_order: i32,
    /// When the product type was created.
    pub created_at: DateTime<Utc>,
}

/// A subcategory with its product types, as returned by the tree endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SubcategoryNode {
    /// The subcategory itself.
    #[serde(flatten)]
    pub subcategory: Subcategory,
    /// Leaf product types, in sort order.
    pub product_types: Vec<ProductType>,
}

/// A category with its full subtree, as returned by the tree endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    /// The category itself.
    #[serde(flatten)]
    pub category: Category,
    /// Subcategories, in sort order.
    pub subcategories: Vec<SubcategoryNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_node_serialization_flattens() {
        let node = CategoryNode {
            category: Category {
                id: CategoryId::new(1),
                brand: Brand::Indikriti,
                name: "Handloom".to_string(),
                slug: "handloom".to_string(),
                sort_order: 1,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            subcategories: Vec::new(),
        };

        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["name"], "Handloom");
        assert_eq!(json["brand"], "indikriti");
        assert!(json["subcategories"].as_array().expect("array").is_empty());
    }
}
