use std::path::Path;
use tracing::info;

use crate::db::DbPool;
use crate::export;
use crate::Result;

/// Export the catalog to `output`, returning the number of recipes written
pub async fn export_to_file(pool: &DbPool, output: &Path) -> Result<usize> {
    let export = export::export_csv(pool).await?;

    tokio::fs::write(output, &export.data).await?;
    info!("Wrote {} recipes to {}", export.rows, output.display());

    Ok(export.rows)
}

/// Import recipes from a CSV file, returning the number added
pub async fn import_from_file(pool: &DbPool, input: &Path) -> Result<usize> {
    let data = tokio::fs::read(input).await?;
    let recipes = export::read_csv(data.as_slice())?;

    let added = export::import_recipes(pool, &recipes).await?;
    info!("Loaded {} recipes from {}", added, input.display());

    Ok(added)
}
