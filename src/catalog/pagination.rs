/// Records per listing page
pub const PAGE_SIZE: usize = 5;

/// Number of pages needed for `total` records; zero for an empty set
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size)
}

/// Pages below 1 are read as page 1
pub fn normalize_page(page: i64) -> usize {
    usize::try_from(page).unwrap_or(0).max(1)
}

/// Offset of the first record on `page`
pub fn page_offset(page: usize, page_size: usize) -> usize {
    page.max(1).saturating_sub(1).saturating_mul(page_size)
}

/// Page on which the record at zero-based `ordinal` appears
pub fn page_of(ordinal: usize, page_size: usize) -> usize {
    ordinal / page_size + 1
}

/// The records of `page` within an already-ordered slice
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page_offset(page, page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}
