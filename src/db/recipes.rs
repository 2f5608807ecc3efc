use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use sqlx::{QueryBuilder, Sqlite};

/// Insert a recipe using any executor (pool or open transaction)
pub async fn insert_recipe<'e, E>(executor: E, new_recipe: &NewRecipe) -> Result<Recipe>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipe (
            recipe_title, recipe_content, video_id, video_url, video_title, video_metadata
        )
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new_recipe.recipe_title)
    .bind(&new_recipe.recipe_content)
    .bind(&new_recipe.video_id)
    .bind(&new_recipe.video_url)
    .bind(&new_recipe.video_title)
    .bind(&new_recipe.video_metadata)
    .fetch_one(executor)
    .await?;

    Ok(recipe)
}

/// Create a new recipe
pub async fn create_recipe(pool: &DbPool, new_recipe: &NewRecipe) -> Result<Recipe> {
    insert_recipe(pool, new_recipe).await
}

/// Get recipe by ID
pub async fn get_recipe(pool: &DbPool, recipe_id: i64) -> Result<Recipe> {
    let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipe WHERE id = ?")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))?;

    Ok(recipe)
}

/// First recipe (lowest id) whose title matches exactly
pub async fn find_recipe_by_title(pool: &DbPool, title: &str) -> Result<Option<Recipe>> {
    let recipe = sqlx::query_as::<_, Recipe>(
        "SELECT * FROM recipe WHERE recipe_title = ? ORDER BY id LIMIT 1",
    )
    .bind(title)
    .fetch_optional(pool)
    .await?;

    Ok(recipe)
}

/// Count all recipes
pub async fn count_all_recipes(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipe")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

/// List one page of recipes in id order
pub async fn list_recipe_page(pool: &DbPool, limit: i64, offset: i64) -> Result<Vec<RecipeSummary>> {
    let recipes = sqlx::query_as::<_, RecipeSummary>(
        "SELECT id, recipe_title, recipe_content FROM recipe ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

/// All recipe ids in listing order
pub async fn list_recipe_ids(pool: &DbPool) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT id FROM recipe ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(ids)
}

/// List every recipe with all columns, in id order
pub async fn list_all_recipes(pool: &DbPool) -> Result<Vec<Recipe>> {
    let recipes = sqlx::query_as::<_, Recipe>("SELECT * FROM recipe ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(recipes)
}

/// Recipes whose search vector matches an FTS5 expression, in id order
pub async fn match_recipes(pool: &DbPool, fts_expression: &str) -> Result<Vec<Recipe>> {
    let recipes = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT * FROM recipe
        WHERE id IN (SELECT rowid FROM recipe_search WHERE recipe_search MATCH ?)
        ORDER BY id
        "#,
    )
    .bind(fts_expression)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

/// Criteria for [`filter_recipes`]; every present criterion must hold
#[derive(Debug, Clone, Default)]
pub struct ContentFilter<'a> {
    /// Case-insensitive substrings of the recipe content
    pub content_contains: Vec<&'a str>,
    /// FTS5 expression matched against the search vector
    pub fts_expression: Option<&'a str>,
}

impl ContentFilter<'_> {
    /// Substring test with Unicode case folding; SQLite `LIKE` only folds ASCII
    fn content_matches(&self, content: &str) -> bool {
        if self.content_contains.is_empty() {
            return true;
        }

        let content = content.to_lowercase();
        self.content_contains
            .iter()
            .all(|needle| content.contains(&needle.to_lowercase()))
    }
}

/// Filter recipes by content substrings and full-text match, in id order
pub async fn filter_recipes(pool: &DbPool, filter: &ContentFilter<'_>) -> Result<Vec<RecipeSummary>> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT r.id, r.recipe_title, r.recipe_content FROM recipe r");

    if let Some(expression) = filter.fts_expression {
        builder
            .push(" WHERE r.id IN (SELECT rowid FROM recipe_search WHERE recipe_search MATCH ")
            .push_bind(expression.to_string())
            .push(")");
    }

    builder.push(" ORDER BY r.id");

    let mut recipes = builder
        .build_query_as::<RecipeSummary>()
        .fetch_all(pool)
        .await?;

    recipes.retain(|recipe| filter.content_matches(&recipe.recipe_content));

    Ok(recipes)
}

/// Update title and content in a single transaction
pub async fn update_recipe(pool: &DbPool, recipe_id: i64, update: &UpdateRecipe) -> Result<Recipe> {
    let mut tx = pool.begin().await?;

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        UPDATE recipe
        SET recipe_title = ?, recipe_content = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&update.recipe_title)
    .bind(&update.recipe_content)
    .bind(recipe_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))?;

    tx.commit().await?;

    Ok(recipe)
}

/// Delete recipe (its images go with it)
pub async fn delete_recipe(pool: &DbPool, recipe_id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM recipe WHERE id = ?")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Recipe {recipe_id} not found")));
    }

    tx.commit().await?;

    Ok(())
}
