//! PostgreSQL repositories for the single-table entities.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use blog_core::domain::{Author, Comment, NewsletterSubscriber, PostImage, Tag, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    AuthorRepository, CommentRepository, ImageRepository, NewsletterRepository, TagRepository,
    UserRepository,
};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::newsletter_subscriber::{self, Entity as SubscriberEntity};
use super::entity::post_image::{self, Entity as ImageEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;
pub type PostgresImageRepository = PostgresBaseRepository<ImageEntity>;
pub type PostgresNewsletterRepository = PostgresBaseRepository<SubscriberEntity>;

/// Mask an address for logging: `j***@example.com`.
pub(crate) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let result = AuthorEntity::find()
            .filter(author::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ImageRepository for PostgresImageRepository {
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<PostImage>, RepoError> {
        let result = ImageEntity::find()
            .filter(post_image::Column::PostId.eq(post_id))
            .order_by_asc(post_image::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl NewsletterRepository for PostgresNewsletterRepository {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<NewsletterSubscriber>, RepoError> {
        tracing::debug!(subscriber_email = %mask_email(email), "Finding subscriber by email");

        let result = SubscriberEntity::find()
            .filter(newsletter_subscriber::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}
