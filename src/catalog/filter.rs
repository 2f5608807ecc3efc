use serde::{Deserialize, Serialize};
use tracing::debug;

use super::fts::match_expression;
use super::pagination::{page_of, page_offset, page_slice, total_pages};
use crate::db::{self, recipes::ContentFilter, DbPool};
use crate::Result;

/// Optional criteria for the combined search, AND-ed together
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilter {
    pub flavor_profile: Option<String>,
    pub meat_type: Option<String>,
    pub query: Option<String>,
}

impl RecipeFilter {
    fn flavor_profile(&self) -> Option<&str> {
        self.flavor_profile.as_deref().filter(|s| !s.is_empty())
    }

    fn meat_type(&self) -> Option<&str> {
        self.meat_type.as_deref().filter(|s| !s.is_empty())
    }

    fn query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.flavor_profile().is_none() && self.meat_type().is_none() && self.query().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterHit {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterPage {
    pub results: Vec<FilterHit>,
    pub total_pages: usize,
    pub current_page: usize,
}

/// Combined flavor / meat / free-text search, paginated over the filtered set
///
/// Unlike [`super::full_text_search`], each hit's `page` is its position in
/// the filtered results, so every hit on a page reports that same page.
pub async fn double_filter(
    pool: &DbPool,
    filter: &RecipeFilter,
    page: usize,
    page_size: usize,
) -> Result<FilterPage> {
    let page = page.max(1);

    let expression = match filter.query() {
        Some(query) => match match_expression(query) {
            Some(expression) => Some(expression),
            None => {
                return Ok(FilterPage {
                    results: vec![],
                    total_pages: 0,
                    current_page: page,
                })
            }
        },
        None => None,
    };

    let content_filter = ContentFilter {
        content_contains: filter
            .flavor_profile()
            .into_iter()
            .chain(filter.meat_type())
            .collect(),
        fts_expression: expression.as_deref(),
    };

    let matches = db::recipes::filter_recipes(pool, &content_filter).await?;
    debug!("Double filter {:?} matched {} recipes", filter, matches.len());

    let offset = page_offset(page, page_size);
    let results = page_slice(&matches, page, page_size)
        .iter()
        .enumerate()
        .map(|(i, recipe)| FilterHit {
            id: recipe.id,
            title: recipe.recipe_title.clone(),
            description: recipe.recipe_content.clone(),
            page: page_of(offset + i, page_size),
        })
        .collect();

    Ok(FilterPage {
        results,
        total_pages: total_pages(matches.len(), page_size),
        current_page: page,
    })
}
