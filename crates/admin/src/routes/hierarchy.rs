//! Brand hierarchy API handlers.
//!
//! The category -> subcategory -> product type trees are brand-scoped; the
//! brand arrives as a path slug ("indikriti", "winsome-lane") and unknown
//! slugs are a 400, not a 404, since the brand set is fixed.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use validator::Validate;

use craftline_core::{Brand, CategoryId, SubcategoryId, slugify};

use crate::db::HierarchyRepository;
use crate::db::hierarchy::{NewCategory, NewProductType, NewSubcategory};
use crate::error::AppError;
use crate::models::hierarchy::{Category, CategoryNode, ProductType, Subcategory};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Build the hierarchy router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/brands/{brand}/hierarchy", get(brand_hierarchy))
        .route("/api/v1/brands/{brand}/categories", post(create_category))
        .route(
            "/api/v1/categories/{id}/subcategories",
            post(create_subcategory),
        )
        .route(
            "/api/v1/subcategories/{id}/product-types",
            post(create_product_type),
        )
}

/// Request for creating a node at any level of the tree.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNodeRequest {
    /// Display name.
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
    /// Optional explicit slug; derived from the name when omitted.
    #[validate(length(min = 1, max = 120, message = "slug must be 1-120 characters"))]
    pub slug: Option<String>,
    /// Ordering within the parent (default 0).
    #[serde(default)]
    pub sort_order: i32,
}

impl CreateNodeRequest {
    /// Explicit slug, or one derived from the name.
    fn resolve_slug(&self) -> Result<String, AppError> {
        if let Some(slug) = &self.slug {
            return Ok(slug.clone());
        }
        match slugify(&self.name) {
            s if s.is_empty() => Err(AppError::BadRequest(
                "name must contain at least one alphanumeric character".to_string(),
            )),
            s => Ok(s),
        }
    }
}

fn parse_brand(slug: &str) -> Result<Brand, AppError> {
    slug.parse::<Brand>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Fetch a brand's full merchandising tree.
///
/// # Errors
///
/// Returns a 400 for an unknown brand slug or a database error.
pub async fn brand_hierarchy(
    State(state): State<AppState>,
    Path(brand): Path<String>,
) -> Result<Json<ApiResponse<Vec<CategoryNode>>>, AppError> {
    let brand = parse_brand(&brand)?;
    let tree = HierarchyRepository::new(state.pool())
        .full_tree(brand)
        .await?;
    Ok(ApiResponse::ok(
        format!("Hierarchy for {}", brand.display_name()),
        tree,
    ))
}

/// Create a category under a brand.
///
/// # Errors
///
/// Returns a 400 for bad input, 409 for a duplicate slug.
pub async fn create_category(
    State(state): State<AppState>,
    Path(brand): Path<String>,
    Json(body): Json<CreateNodeRequest>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let brand = parse_brand(&brand)?;
    body.validate()?;
    let slug = body.resolve_slug()?;

    let category = HierarchyRepository::new(state.pool())
        .create_category(
            brand,
            NewCategory {
                name: body.name,
                slug,
                sort_order: body.sort_order,
            },
        )
        .await?;

    Ok(ApiResponse::ok("Category created", category))
}

/// Create a subcategory under a category.
///
/// # Errors
///
/// Returns a 404 if the parent category does not exist, 409 for a duplicate
/// slug.
pub async fn create_subcategory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CreateNodeRequest>,
) -> Result<Json<ApiResponse<Subcategory>>, AppError> {
    body.validate()?;
    let slug = body.resolve_slug()?;

    let subcategory = HierarchyRepository::new(state.pool())
        .create_subcategory(
            CategoryId::new(id),
            NewSubcategory {
                name: body.name,
                slug,
                sort_order: body.sort_order,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("category {id}"))
            }
            other => other.into(),
        })?;

    Ok(ApiResponse::ok("Subcategory created", subcategory))
}

/// Create a product type under a subcategory.
///
/// # Errors
///
/// Returns a 404 if the parent subcategory does not exist, 409 for a
/// duplicate slug.
pub async fn create_product_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CreateNodeRequest>,
) -> Result<Json<ApiResponse<ProductType>>, AppError> {
    body.validate()?;
    let slug = body.resolve_slug()?;

    let product_type = HierarchyRepository::new(state.pool())
        .create_product_type(
            SubcategoryId::new(id),
            NewProductType {
                name: body.name,
                slug,
                sort_order: body.sort_order,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("subcategory {id}"))
            }
            other => other.into(),
        })?;

    Ok(ApiResponse::ok("Product type created", product_type))
}
