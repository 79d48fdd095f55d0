//! Merging local and web results into one ranked list.

use super::value_objects::{RetrievalResult, Source};
use std::collections::HashSet;

/// Normalize an identifier for duplicate detection.
///
/// Local ids are trimmed. Web URLs additionally get a lower-cased scheme and
/// host, lose their `#fragment`, and lose a trailing `/`.
pub fn normalize_identifier(source: Source, id_or_url: &str) -> String {
    let trimmed = id_or_url.trim();
    match source {
        Source::Local => trimmed.to_string(),
        Source::Web => normalize_url(trimmed),
    }
}

fn normalize_url(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);

    let normalized = match without_fragment.split_once("://") {
        Some((scheme, rest)) => {
            let host_end = rest.find(['/', '?']).unwrap_or(rest.len());
            let (host, tail) = rest.split_at(host_end);
            format!(
                "{}://{}{}",
                scheme.to_ascii_lowercase(),
                host.to_ascii_lowercase(),
                tail
            )
        }
        None => without_fragment.to_string(),
    };

    normalized.trim_end_matches('/').to_string()
}

/// Merge already-ranked local and web results.
///
/// Local results are placed before web results, then the combined list is
/// stably sorted by score descending so that on equal scores local results
/// stay ahead of web results and each source keeps its own order. The first
/// occurrence of each normalized identifier wins, the list is truncated to
/// `cap`, and ranks are assigned starting at 1.
pub fn merge_results(
    local: Vec<RetrievalResult>,
    web: Vec<RetrievalResult>,
    cap: usize,
) -> Vec<RetrievalResult> {
    let mut combined: Vec<RetrievalResult> = local.into_iter().chain(web).collect();
    combined.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    combined
        .into_iter()
        .filter(|r| seen.insert(normalize_identifier(r.source, &r.id_or_url)))
        .take(cap)
        .enumerate()
        .map(|(i, mut r)| {
            r.rank = i + 1;
            r
        })
        .collect()
}
