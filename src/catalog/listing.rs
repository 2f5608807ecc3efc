use serde::Serialize;

use super::pagination::{page_offset, total_pages};
use super::title::clean_title;
use crate::db::{self, DbPool};
use crate::Result;

/// A recipe as shown on the listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub entries: Vec<ListingEntry>,
    pub page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// One page of the catalog in id order, titles cleaned for display
///
/// Pages past the end come back empty rather than as an error.
pub async fn list_page(pool: &DbPool, page: usize, page_size: usize) -> Result<ListingPage> {
    let page = page.max(1);
    let offset = i64::try_from(page_offset(page, page_size)).unwrap_or(i64::MAX);
    let limit = i64::try_from(page_size).unwrap_or(i64::MAX);

    let recipes = db::recipes::list_recipe_page(pool, limit, offset).await?;
    let total = db::recipes::count_all_recipes(pool).await?;
    let total = usize::try_from(total).unwrap_or(0);

    let entries = recipes
        .into_iter()
        .map(|recipe| ListingEntry {
            id: recipe.id,
            title: clean_title(&recipe.recipe_title),
            content: recipe.recipe_content,
        })
        .collect();

    Ok(ListingPage {
        entries,
        page,
        total,
        total_pages: total_pages(total, page_size),
    })
}
