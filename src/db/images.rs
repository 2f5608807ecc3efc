use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};

/// Store an uploaded image for an existing recipe
///
/// The recipe check and the insert share one transaction, so an unknown
/// recipe id never leaves an image row behind.
pub async fn create_image(pool: &DbPool, new_image: &NewImage) -> Result<ImageInfo> {
    let mut tx = pool.begin().await?;

    let recipe_id: Option<i64> = sqlx::query_scalar("SELECT id FROM recipe WHERE id = ?")
        .bind(new_image.recipe_id)
        .fetch_optional(&mut *tx)
        .await?;

    let recipe_id = recipe_id.ok_or_else(|| {
        Error::NotFound(format!("No recipe found with ID {}", new_image.recipe_id))
    })?;

    let image = sqlx::query_as::<_, ImageInfo>(
        r#"
        INSERT INTO image (filename, image_data, recipe_id)
        VALUES (?, ?, ?)
        RETURNING id, filename, recipe_id
        "#,
    )
    .bind(&new_image.filename)
    .bind(&new_image.image_data)
    .bind(recipe_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(image)
}

/// Images attached to a recipe, oldest first
pub async fn list_images_for_recipe(pool: &DbPool, recipe_id: i64) -> Result<Vec<ImageInfo>> {
    let images = sqlx::query_as::<_, ImageInfo>(
        "SELECT id, filename, recipe_id FROM image WHERE recipe_id = ? ORDER BY id",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(images)
}

/// Count all images
pub async fn count_images(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM image")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}
