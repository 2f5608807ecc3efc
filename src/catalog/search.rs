use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::fts::match_expression;
use super::pagination::page_of;
use crate::db::{self, DbPool};
use crate::Result;

/// A full-text match, tagged with the listing page it appears on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub description: String,
    pub page: usize,
}

/// Full-text search across the whole catalog
///
/// Every match is returned; `page` is where the recipe sits in the
/// unfiltered id-ordered listing, not a page of the results.
pub async fn full_text_search(pool: &DbPool, query: &str, page_size: usize) -> Result<Vec<SearchHit>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(vec![]);
    }

    let ordinals: HashMap<i64, usize> = db::recipes::list_recipe_ids(pool)
        .await?
        .into_iter()
        .enumerate()
        .map(|(ordinal, id)| (id, ordinal))
        .collect();

    let Some(expression) = match_expression(query) else {
        return Ok(vec![]);
    };

    let matches = db::recipes::match_recipes(pool, &expression).await?;
    debug!("Search {:?} matched {} recipes", query, matches.len());

    let hits = matches
        .into_iter()
        .filter_map(|recipe| {
            let ordinal = ordinals.get(&recipe.id)?;
            Some(SearchHit {
                title: recipe.recipe_title,
                description: recipe.recipe_content,
                page: page_of(*ordinal, page_size),
            })
        })
        .collect();

    Ok(hits)
}
