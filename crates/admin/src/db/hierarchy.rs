//! Brand hierarchy repository.
//!
//! Database access for the category -> subcategory -> product type trees.
//! The tree endpoint runs one query per level and assembles the nesting in
//! memory; the trees are small (tens of rows per brand).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use craftline_core::{Brand, CategoryId, ProductTypeId, SubcategoryId};

use super::RepositoryError;
use crate::models::hierarchy::{
    Category, CategoryNode, ProductType, Subcategory, SubcategoryNode,
};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    brand: String,
    name: String,
    slug: String,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let brand: Brand = row.brand.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid brand in database: {e}"))
        })?;

        Ok(Self {
            id: CategoryId::new(row.id),
            brand,
            name: row.name,
            slug: row.slug,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for subcategory queries.
#[derive(Debug, sqlx::FromRow)]
struct SubcategoryRow {
    id: i64,
    category_id: i64,
    name: String,
    slug: String,
    sort_order: i32,
    created_at: DateTime<Utc>,
}

impl From<SubcategoryRow> for Subcategory {
    fn from(row: SubcategoryRow) -> Self {
        Self {
            id: SubcategoryId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            slug: row.slug,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for product type queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductTypeRow {
    id: i64,
    subcategory_id: i64,
    name: String,
    slug: String,
    sort_order: i32,
    created_at: DateTime<Utc>,
}

impl From<ProductTypeRow> for ProductType {
    fn from(row: ProductTypeRow) -> Self {
        Self {
            id: ProductTypeId::new(row.id),
            subcategory_id: SubcategoryId::new(row.subcategory_id),
            name: row.name,
            slug: row.slug,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Input Types
// =============================================================================

/// Parameters for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    /// Display name.
    pub name: String,
    /// URL slug, unique within the brand.
    pub slug: String,
    /// Ordering within the brand.
    pub sort_order: i32,
}

/// Parameters for creating a subcategory.
#[derive(Debug, Clone)]
pub struct NewSubcategory {
    /// Display name.
    pub name: String,
    /// URL slug, unique within the parent category.
    pub slug: String,
    /// Ordering within the parent.
    pub sort_order: i32,
}

/// Parameters for creating a product type.
#[derive(Debug, Clone)]
pub struct NewProductType {
    /// Display name.
    pub name: String,
    /// URL slug, unique within the parent subcategory.
    pub slug: String,
    /// Ordering within the parent.
    pub sort_order: i32,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for brand hierarchy database operations.
pub struct HierarchyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HierarchyRepository<'a> {
    /// Create a new hierarchy repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the full tree for a brand, ordered by `sort_order` at every level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn full_tree(&self, brand: Brand) -> Result<Vec<CategoryNode>, RepositoryError> {
        let categories: Vec<Category> = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, brand, name, slug, sort_order, created_at, updated_at
            FROM categories
            WHERE brand = $1
            ORDER BY sort_order, id
            ",
        )
        .bind(brand.as_str())
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<_, _>>()?;

        let subcategories: Vec<Subcategory> = sqlx::query_as::<_, SubcategoryRow>(
            r"
            SELECT s.id, s.category_id, s.name, s.slug, s.sort_order, s.created_at
            FROM subcategories s
            JOIN categories c ON c.id = s.category_id
            WHERE c.brand = $1
            ORDER BY s.sort_order, s.id
            ",
        )
        .bind(brand.as_str())
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        let product_types: Vec<ProductType> = sqlx::query_as::<_, ProductTypeRow>(
            r"
            SELECT p.id, p.subcategory_id, p.name, p.slug, p.sort_order, p.created_at
            FROM product_types p
            JOIN subcategories s ON s.id = p.subcategory_id
            JOIN categories c ON c.id = s.category_id
            WHERE c.brand = $1
            ORDER BY p.sort_order, p.id
            ",
        )
        .bind(brand.as_str())
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        Ok(assemble_tree(categories, subcategories, product_types))
    }

    /// Create a category under a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken within the
    /// brand, or `RepositoryError::Database` on other failures.
    pub async fn create_category(
        &self,
        brand: Brand,
        new: NewCategory,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO categories (brand, name, slug, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, brand, name, slug, sort_order, created_at, updated_at
            ",
        )
        .bind(brand.as_str())
        .bind(&new.name)
        .bind(&new.slug)
        .bind(new.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| constraint_error(e, "category slug"))?;

        row.try_into()
    }

    /// Create a subcategory under a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the parent category does not
    /// exist, `RepositoryError::Conflict` on a duplicate slug.
    pub async fn create_subcategory(
        &self,
        category_id: CategoryId,
        new: NewSubcategory,
    ) -> Result<Subcategory, RepositoryError> {
        let row = sqlx::query_as::<_, SubcategoryRow>(
            r"
            INSERT INTO subcategories (category_id, name, slug, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, category_id, name, slug, sort_order, created_at
            ",
        )
        .bind(category_id.as_i64())
        .bind(&new.name)
        .bind(&new.slug)
        .bind(new.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| constraint_error(e, "subcategory slug"))?;

        Ok(row.into())
    }

    /// Create a product type under a subcategory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the parent subcategory does not
    /// exist, `RepositoryError::Conflict` on a duplicate slug.
    pub async fn create_product_type(
        &self,
        subcategory_id: SubcategoryId,
        new: NewProductType,
    ) -> Result<ProductType, RepositoryError> {
        let row = sqlx::query_as::<_, ProductTypeRow>(
            r"
            INSERT INTO product_types (subcategory_id, name, slug, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, subcategory_id, name, slug, sort_order, created_at
            ",
        )
        .bind(subcategory_id.as_i64())
        .bind(&new.name)
        .bind(&new.slug)
        .bind(new.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| constraint_error(e, "product type slug"))?;

        Ok(row.into())
    }
}

/// Map constraint violations to domain errors: unique -> Conflict,
/// foreign key -> NotFound (missing parent).
fn constraint_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(db) = &e {
        match db.kind() {
            sqlx::error::ErrorKind::UniqueViolation => {
                return RepositoryError::Conflict(format!("{what} already exists"));
            }
            sqlx::error::ErrorKind::ForeignKeyViolation => {
                return RepositoryError::NotFound;
            }
            _ => {}
        }
    }
    RepositoryError::Database(e)
}

/// Nest flat level queries into the tree shape.
fn assemble_tree(
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    product_types: Vec<ProductType>,
) -> Vec<CategoryNode> {
    use std::collections::HashMap;

    let mut types_by_subcategory: HashMap<SubcategoryId, Vec<ProductType>> = HashMap::new();
    for product_type in product_types {
        types_by_subcategory
            .entry(product_type.subcategory_id)
            .or_default()
            .push(product_type);
    }

    let mut subs_by_category: HashMap<CategoryId, Vec<SubcategoryNode>> = HashMap::new();
    for subcategory in subcategories {
        let product_types = types_by_subcategory
            .remove(&subcategory.id)
            .unwrap_or_default();
        subs_by_category
            .entry(subcategory.category_id)
            .or_default()
            .push(SubcategoryNode {
                subcategory,
                product_types,
            });
    }

    categories
        .into_iter()
        .map(|category| {
            let subcategories = subs_by_category.remove(&category.id).unwrap_or_default();
            CategoryNode {
                category,
                subcategories,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            brand: Brand::Indikriti,
            name: name.to_string(),
            slug: name.to_lowercase(),
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn subcategory(id: i64, category_id: i64, name: &str) -> Subcategory {
        Subcategory {
            id: SubcategoryId::new(id),
            category_id: CategoryId::new(category_id),
            name: name.to_string(),
            slug: name.to_lowercase(),
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    fn product_type(id: i64, subcategory_id: i64, name: &str) -> ProductType {
        ProductType {
            id: ProductTypeId::new(id),
            subcategory_id: SubcategoryId::new(subcategory_id),
            name: name.to_string(),
            slug: name.to_lowercase(),
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_assemble_tree_nests_levels() {
        let tree = assemble_tree(
            vec![category(1, "Handloom"), category(2, "Pottery")],
            vec![subcategory(10, 1, "Sarees"), subcategory(11, 2, "Bowls")],
            vec![
                product_type(100, 10, "Cotton"),
                product_type(101, 10, "Silk"),
            ],
        );

        assert_eq!(tree.len(), 2);
        let handloom = tree.iter().find(|c| c.category.name == "Handloom").expect("handloom");
        assert_eq!(handloom.subcategories.len(), 1);
        let sarees = handloom.subcategories.first().expect("sarees");
        assert_eq!(sarees.product_types.len(), 2);

        let pottery = tree.iter().find(|c| c.category.name == "Pottery").expect("pottery");
        let bowls = pottery.subcategories.first().expect("bowls");
        assert!(bowls.product_types.is_empty());
    }

    #[test]
    fn test_assemble_tree_preserves_category_order() {
        let tree = assemble_tree(
            vec![category(2, "B"), category(1, "A")],
            Vec::new(),
            Vec::new(),
        );
        let names: Vec<&str> = tree.iter().map(|c| c.category.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_category_row_rejects_unknown_brand() {
        let row = CategoryRow {
            id: 1,
            brand: "not-a-brand".to_string(),
            name: "X".to_string(),
            slug: "x".to_string(),
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let err = Category::try_from(row).expect_err("invalid brand");
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
