//! Query layer: listing, full-text search and the combined attribute filter.
//!
//! Page numbers are 1-based everywhere. Listing and search report pages
//! against the full id-ordered catalog; the combined filter reports pages
//! against its own filtered result list.

pub mod filter;
pub mod fts;
pub mod listing;
pub mod pagination;
pub mod search;
pub mod title;

pub use filter::{double_filter, FilterHit, FilterPage, RecipeFilter};
pub use listing::{list_page, ListingEntry, ListingPage};
pub use search::{full_text_search, SearchHit};
pub use title::clean_title;
