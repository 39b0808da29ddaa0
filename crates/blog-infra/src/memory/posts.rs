use std::cmp::Ordering;
use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use blog_core::domain::{ArchiveMonth, Post, PostSummary};
use blog_core::error::RepoError;
use blog_core::i18n::Locale;
use blog_core::ports::{BaseRepository, PostRepository};
use blog_core::related::{RelatedCandidate, compare_candidates};
use blog_core::search::{PostFilter, PostOrdering};
use blog_core::similarity::{SIMILARITY_THRESHOLD, similarity};

use super::{InMemoryStore, Tables};

impl Tables {
    fn summarize(&self, post: &Post, locale: &Locale) -> Option<PostSummary> {
        let translation = post.translation(locale)?;

        let mut tags = post.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Some(PostSummary {
            id: post.id,
            title: translation.title.clone(),
            slug: translation.slug.clone(),
            publish: post.publish,
            author: self
                .users
                .get(&post.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            category: post
                .category_id
                .and_then(|id| self.categories.get(&id))
                .and_then(|c| c.localized(locale)),
            tags,
            visits: post.visits,
            comment_count: self
                .comments
                .values()
                .filter(|c| c.post_id == post.id && c.active)
                .count() as i64,
            similarity: None,
        })
    }

    /// Published posts matching `filter`, unsorted.
    fn matching<'a>(
        &'a self,
        filter: &PostFilter,
        locale: &Locale,
    ) -> Vec<(&'a Post, PostSummary)> {
        self.posts
            .values()
            .filter(|p| p.is_published())
            .filter_map(|post| {
                let mut summary = self.summarize(post, locale)?;
                let keep = match filter {
                    PostFilter::All => true,
                    PostFilter::Text(query) => {
                        let score = similarity(&summary.title, query);
                        summary.similarity = Some(score);
                        score > SIMILARITY_THRESHOLD
                    }
                    PostFilter::Date { year, month } => {
                        post.publish.year() == *year && post.publish.month() == *month
                    }
                    PostFilter::Tag(tag_id) => post.has_tag(*tag_id),
                    PostFilter::Category(category_id) => post.category_id == Some(*category_id),
                };
                keep.then_some((post, summary))
            })
            .collect()
    }

    fn slug_taken(&self, post: &Post) -> Option<String> {
        let date = post.publish_date();
        post.translations.iter().find_map(|translation| {
            self.posts
                .values()
                .filter(|other| other.id != post.id && other.publish_date() == date)
                .flat_map(|other| other.translations.iter())
                .any(|t| t.language == translation.language && t.slug == translation.slug)
                .then(|| translation.slug.clone())
        })
    }
}

fn compare(ordering: PostOrdering, a: &(&Post, PostSummary), b: &(&Post, PostSummary)) -> Ordering {
    let (post_a, summary_a) = a;
    let (post_b, summary_b) = b;
    let newest = || post_b.publish.cmp(&post_a.publish);

    let primary = match ordering {
        PostOrdering::Relevance => summary_b
            .similarity
            .unwrap_or(0.0)
            .total_cmp(&summary_a.similarity.unwrap_or(0.0))
            .then_with(newest),
        PostOrdering::NewestFirst => newest(),
        PostOrdering::OldestFirst => post_a.publish.cmp(&post_b.publish),
        PostOrdering::EarliestCreated => post_a.created_at.cmp(&post_b.created_at),
        PostOrdering::MostVisited => post_b.visits.cmp(&post_a.visits).then_with(newest),
        PostOrdering::MostCommented => summary_b
            .comment_count
            .cmp(&summary_a.comment_count)
            .then_with(newest),
    };
    primary.then_with(|| post_a.id.cmp(&post_b.id))
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&entity.author_id) {
            return Err(RepoError::Constraint("post references a missing author".into()));
        }
        if entity
            .category_id
            .is_some_and(|id| !tables.categories.contains_key(&id))
        {
            return Err(RepoError::Constraint("post references a missing category".into()));
        }
        if let Some(tag) = entity.tags.iter().find(|t| !tables.tags.contains_key(&t.id)) {
            return Err(RepoError::Constraint(format!("unknown tag '{}'", tag.slug)));
        }
        if let Some(slug) = tables.slug_taken(&entity) {
            return Err(RepoError::Constraint(format!(
                "slug '{slug}' already used on {}",
                entity.publish_date()
            )));
        }

        tables.posts.insert(entity.id, entity.clone());
        tracing::debug!(post_id = %entity.id, status = entity.status.as_str(), "Post saved");
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_post(id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn count_published(&self, filter: &PostFilter, locale: &Locale) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.matching(filter, locale).len() as u64)
    }

    async fn list_published(
        &self,
        filter: &PostFilter,
        ordering: PostOrdering,
        locale: &Locale,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostSummary>, RepoError> {
        let tables = self.tables.read().await;
        let mut matching = tables.matching(filter, locale);
        matching.sort_by(|a, b| compare(ordering, a, b));

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(_, summary)| summary)
            .collect())
    }

    async fn find_published_by_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| p.is_published() && p.publish_date() == date)
            .filter(|p| p.translations.iter().any(|t| t.slug == slug))
            .min_by_key(|p| p.id)
            .cloned())
    }

    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .get(&id)
            .filter(|p| p.is_published())
            .cloned())
    }

    async fn related_candidates(
        &self,
        post_id: Uuid,
        locale: &Locale,
        limit: u64,
    ) -> Result<Vec<RelatedCandidate>, RepoError> {
        let tables = self.tables.read().await;
        let Some(source) = tables.posts.get(&post_id) else {
            return Ok(Vec::new());
        };

        let mut candidates: Vec<RelatedCandidate> = tables
            .matching(&PostFilter::All, locale)
            .into_iter()
            .filter(|(post, _)| post.id != post_id)
            .filter_map(|(post, summary)| {
                let shared = post.tags.iter().filter(|t| source.has_tag(t.id)).count() as u32;
                (shared > 0).then_some(RelatedCandidate {
                    post: summary,
                    shared_tags: shared,
                })
            })
            .collect();
        candidates.sort_by(compare_candidates);
        candidates.truncate(limit as usize);

        Ok(candidates)
    }

    async fn increment_visits(&self, post_id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(post) = tables.posts.get_mut(&post_id) {
            post.visits += 1;
        }
        Ok(())
    }

    async fn archive_months(&self, limit: u64) -> Result<Vec<ArchiveMonth>, RepoError> {
        let tables = self.tables.read().await;
        let months: BTreeSet<(i32, u32)> = tables
            .posts
            .values()
            .filter(|p| p.is_published())
            .map(|p| (p.publish.year(), p.publish.month()))
            .collect();

        Ok(months
            .into_iter()
            .rev()
            .take(limit as usize)
            .map(|(year, month)| ArchiveMonth { year, month })
            .collect())
    }
}
