// src/merge.rs
//! # Article Merger
//! Pure merge step for fan-out results: drop articles without a URL,
//! deduplicate by URL (first seen wins), then order newest first.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::article::Article;

/// Merge batches in the order given.
///
/// The sort is stable, so articles with equal timestamps keep their
/// first-seen order and the output depends only on the input order.
pub fn merge<I>(batches: I) -> Vec<Article>
where
    I: IntoIterator<Item = Vec<Article>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();

    for batch in batches {
        for article in batch {
            let Some(key) = article.key() else {
                continue;
            };
            if seen.insert(key.to_string()) {
                unique.push(article);
            }
        }
    }

    unique.sort_by_cached_key(|a| Reverse(a.published_millis()));
    unique
}
