//! Seed the brand category hierarchies with starter data.
//!
//! Idempotent: inserts upsert on `(brand, slug)` / `(parent, slug)`, so the
//! command can be re-run safely after new migrations.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use craftline_core::{Brand, slugify};

use super::{CommandError, database_url};

struct SeedSubcategory {
    name: &'static str,
    product_types: &'static [&'static str],
}

struct SeedCategory {
    name: &'static str,
    subcategories: &'static [SeedSubcategory],
}

const INDIKRITI: &[SeedCategory] = &[
    SeedCategory {
        name: "Handloom",
        subcategories: &[
            SeedSubcategory {
                name: "Sarees",
                product_types: &["Cotton", "Silk", "Chanderi"],
            },
            SeedSubcategory {
                name: "Dupattas",
                product_types: &["Block Print", "Bandhani"],
            },
        ],
    },
    SeedCategory {
        name: "Home Decor",
        subcategories: &[
            SeedSubcategory {
                name: "Wall Hangings",
                product_types: &["Madhubani", "Warli"],
            },
            SeedSubcategory {
                name: "Pottery",
                product_types: &["Terracotta", "Blue Pottery"],
            },
        ],
    },
];

const WINSOME_LANE: &[SeedCategory] = &[
    SeedCategory {
        name: "Apparel",
        subcategories: &[
            SeedSubcategory {
                name: "Dresses",
                product_types: &["Maxi", "Midi"],
            },
            SeedSubcategory {
                name: "Tops",
                product_types: &["Blouses", "Tunics"],
            },
        ],
    },
    SeedCategory {
        name: "Accessories",
        subcategories: &[SeedSubcategory {
            name: "Scarves",
            product_types: &["Silk Scarves"],
        }],
    },
];

/// Seed both brands' hierarchies.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    seed_brand(&pool, Brand::Indikriti, INDIKRITI).await?;
    seed_brand(&pool, Brand::WinsomeLane, WINSOME_LANE).await?;

    tracing::info!("Seeding complete");
    Ok(())
}

async fn seed_brand(
    pool: &PgPool,
    brand: Brand,
    categories: &[SeedCategory],
) -> Result<(), CommandError> {
    tracing::info!(brand = %brand, "Seeding hierarchy");

    for (cat_order, category) in (0i32..).zip(categories.iter()) {
        let category_id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO categories (brand, name, slug, sort_order)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (brand, slug) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            ",
        )
        .bind(brand.as_str())
        .bind(category.name)
        .bind(slugify(category.name))
        .bind(cat_order)
        .fetch_one(pool)
        .await?;

        for (sub_order, subcategory) in (0i32..).zip(category.subcategories.iter()) {
            let subcategory_id: i64 = sqlx::query_scalar(
                r"
                INSERT INTO subcategories (category_id, name, slug, sort_order)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (category_id, slug) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                ",
            )
            .bind(category_id)
            .bind(subcategory.name)
            .bind(slugify(subcategory.name))
            .bind(sub_order)
            .fetch_one(pool)
            .await?;

            for (type_order, product_type) in (0i32..).zip(subcategory.product_types.iter()) {
                sqlx::query(
                    r"
                    INSERT INTO product_types (subcategory_id, name, slug, sort_order)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (subcategory_id, slug) DO UPDATE SET name = EXCLUDED.name
                    ",
                )
                .bind(subcategory_id)
                .bind(*product_type)
                .bind(slugify(product_type))
                .bind(type_order)
                .execute(pool)
                .await?;
            }
        }
    }

    Ok(())
}
