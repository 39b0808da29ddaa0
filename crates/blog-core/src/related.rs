//! Related-post ranking for the detail page.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::domain::PostSummary;

/// Maximum number of related posts shown under a post.
pub const RELATED_POSTS_LIMIT: usize = 4;

/// A published post sharing at least one tag with the post being viewed.
#[derive(Debug, Clone)]
pub struct RelatedCandidate {
    pub post: PostSummary,
    pub shared_tags: u32,
}

/// Rank candidates by shared tag count, then publish date, newest first.
///
/// The source post and candidates without a shared tag are dropped, and at
/// most `limit` posts are returned.
pub fn rank_related(
    source_id: Uuid,
    mut candidates: Vec<RelatedCandidate>,
    limit: usize,
) -> Vec<PostSummary> {
    candidates.retain(|c| c.post.id != source_id && c.shared_tags > 0);
    candidates.sort_by(compare_candidates);
    candidates.dedup_by(|a, b| a.post.id == b.post.id);
    candidates
        .into_iter()
        .take(limit)
        .map(|c| c.post)
        .collect()
}

/// Shared tags descending, then publish date descending, then id.
pub fn compare_candidates(a: &RelatedCandidate, b: &RelatedCandidate) -> Ordering {
    b.shared_tags
        .cmp(&a.shared_tags)
        .then_with(|| b.post.publish.cmp(&a.post.publish))
        .then_with(|| a.post.id.cmp(&b.post.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candidate(title: &str, days: i64, shared: u32) -> RelatedCandidate {
        let base = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        RelatedCandidate {
            post: PostSummary {
                id: Uuid::new_v4(),
                title: title.to_string(),
                slug: title.to_lowercase(),
                publish: base + Duration::days(days),
                author: "vgb".to_string(),
                category: None,
                tags: Vec::new(),
                visits: 0,
                comment_count: 0,
                similarity: None,
            },
            shared_tags: shared,
        }
    }

    #[test]
    fn test_ranks_by_shared_tags_then_newest() {
        let source = candidate("Source", 0, 3);
        let source_id = source.post.id;
        let candidates = vec![
            source,
            candidate("OldTwo", 1, 2),
            candidate("NewTwo", 5, 2),
            candidate("Three", 2, 3),
            candidate("One", 9, 1),
            candidate("Zero", 10, 0),
            candidate("AlsoOne", 3, 1),
        ];

        let titles: Vec<String> = rank_related(source_id, candidates, RELATED_POSTS_LIMIT)
            .into_iter()
            .map(|p| p.title)
            .collect();

        assert_eq!(titles, vec!["Three", "NewTwo", "OldTwo", "One"]);
    }

    #[test]
    fn test_never_includes_source() {
        let source = candidate("Source", 0, 5);
        let source_id = source.post.id;
        let ranked = rank_related(source_id, vec![source], RELATED_POSTS_LIMIT);
        assert!(ranked.is_empty());
    }
}
