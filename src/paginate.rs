// src/paginate.rs
//! Page slicing over an already ordered collection.

/// One page plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub slice: Vec<T>,
    pub total_results: usize,
}

/// Slice `items` to `[(page-1)*page_size, page*page_size)`, clipped to the
/// collection. A start past the end yields an empty slice, never an error.
///
/// `page` 0 is read as 1; `page_size` 0 yields an empty slice.
pub fn paginate<T>(items: Vec<T>, page: u32, page_size: u32) -> Page<T> {
    let total_results = items.len();
    let page = page.max(1) as usize;
    let size = page_size as usize;

    let start = (page - 1).saturating_mul(size);
    if size == 0 || start >= total_results {
        return Page {
            slice: Vec::new(),
            total_results,
        };
    }
    let end = start.saturating_add(size).min(total_results);

    let slice = items.into_iter().skip(start).take(end - start).collect();
    Page {
        slice,
        total_results,
    }
}
