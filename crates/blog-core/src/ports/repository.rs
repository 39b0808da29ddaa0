use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    ArchiveMonth, Author, Category, Comment, NewsletterSubscriber, Post, PostImage, PostSummary,
    Tag, User,
};
use crate::error::RepoError;
use crate::i18n::Locale;
use crate::related::RelatedCandidate;
use crate::search::{PostFilter, PostOrdering};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Author profiles.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError>;
}

#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;
}

/// Categories. Deleting one leaves its posts uncategorised.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Case-insensitive lookup by the name in any language.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Active comments of a post, oldest first.
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

#[async_trait]
pub trait ImageRepository: BaseRepository<PostImage, Uuid> {
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<PostImage>, RepoError>;
}

#[async_trait]
pub trait NewsletterRepository: BaseRepository<NewsletterSubscriber, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSubscriber>, RepoError>;
}

/// Post repository. Everything except the [`BaseRepository`] methods only
/// sees published posts.
///
/// Deleting a post removes its translations, tag links, comments and images.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Number of published posts matching `filter`.
    async fn count_published(&self, filter: &PostFilter, locale: &Locale)
    -> Result<u64, RepoError>;

    /// A slice of published posts matching `filter`, rendered for `locale`.
    async fn list_published(
        &self,
        filter: &PostFilter,
        ordering: PostOrdering,
        locale: &Locale,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostSummary>, RepoError>;

    /// The published post with a translation slug of `slug` published on `date`.
    async fn find_published_by_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError>;

    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Published posts sharing at least one tag with `post_id`, the post
    /// itself excluded.
    async fn related_candidates(
        &self,
        post_id: Uuid,
        locale: &Locale,
        limit: u64,
    ) -> Result<Vec<RelatedCandidate>, RepoError>;

    async fn increment_visits(&self, post_id: Uuid) -> Result<(), RepoError>;

    /// Months with published posts, most recent first.
    async fn archive_months(&self, limit: u64) -> Result<Vec<ArchiveMonth>, RepoError>;
}
