//! CSV dump of the recipe table, and the matching import used to seed a catalog.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::{info, warn};

use crate::db::{
    self,
    models::{NewRecipe, Recipe},
    DbPool,
};
use crate::{Error, Result};

/// File name offered to browsers for the export download
pub const EXPORT_FILENAME: &str = "recipe_export.csv";

/// One CSV row; the column order is the export header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub recipe_title: String,
    #[serde(default)]
    pub recipe_content: String,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
    #[serde(default)]
    pub video_metadata: Option<String>,
}

impl From<Recipe> for RecipeRecord {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: Some(recipe.id),
            recipe_title: recipe.recipe_title,
            recipe_content: recipe.recipe_content,
            video_id: recipe.video_id,
            video_url: recipe.video_url,
            video_title: recipe.video_title,
            video_metadata: recipe.video_metadata,
        }
    }
}

impl From<RecipeRecord> for NewRecipe {
    fn from(record: RecipeRecord) -> Self {
        Self {
            recipe_title: record.recipe_title,
            recipe_content: record.recipe_content,
            video_id: record.video_id,
            video_url: record.video_url,
            video_title: record.video_title,
            video_metadata: record.video_metadata,
        }
    }
}

/// Write recipes as CSV with a header row
pub fn write_csv<W: Write>(writer: W, recipes: Vec<Recipe>) -> Result<W> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for recipe in recipes {
        csv_writer.serialize(RecipeRecord::from(recipe))?;
    }
    csv_writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))
}

/// Read recipe rows; an `id` column is accepted and ignored
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<NewRecipe>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut recipes = Vec::new();
    for record in csv_reader.deserialize::<RecipeRecord>() {
        recipes.push(NewRecipe::from(record?));
    }
    Ok(recipes)
}

/// A serialized export and the number of recipe rows in it
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub data: Vec<u8>,
    pub rows: usize,
}

/// Serialize the whole recipe table; an empty table is reported as not found
pub async fn export_csv(pool: &DbPool) -> Result<CsvExport> {
    let recipes = db::recipes::list_all_recipes(pool).await?;

    if recipes.is_empty() {
        warn!("Attempted CSV export, but the recipe table is empty.");
        return Err(Error::NotFound("No recipes found to export.".to_string()));
    }

    let rows = recipes.len();
    let data = write_csv(Vec::new(), recipes)?;
    info!("Exported {} recipes to CSV ({} bytes)", rows, data.len());

    Ok(CsvExport { data, rows })
}

/// Insert every recipe in one transaction, returning how many were added
pub async fn import_recipes(pool: &DbPool, recipes: &[NewRecipe]) -> Result<usize> {
    let mut tx = pool.begin().await?;

    for recipe in recipes {
        db::recipes::insert_recipe(&mut *tx, recipe).await?;
    }

    tx.commit().await?;
    info!("Imported {} recipes", recipes.len());

    Ok(recipes.len())
}
