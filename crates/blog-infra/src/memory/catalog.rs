//! Users, authors, categories, tags, comments, images and subscribers.

use async_trait::async_trait;
use uuid::Uuid;

use blog_core::domain::{
    Author, Category, Comment, NewsletterSubscriber, PostImage, Tag, User,
};
use blog_core::error::RepoError;
use blog_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, ImageRepository,
    NewsletterRepository, TagRepository, UserRepository,
};

use super::InMemoryStore;

fn constraint(message: impl Into<String>) -> RepoError {
    RepoError::Constraint(message.into())
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != entity.id && u.username == entity.username)
        {
            return Err(constraint(format!("username '{}' taken", entity.username)));
        }
        tables.users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        tables.authors.retain(|_, a| a.user_id != id);
        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn save(&self, entity: Author) -> Result<Author, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&entity.user_id) {
            return Err(constraint("author references a missing user"));
        }
        if tables
            .authors
            .values()
            .any(|a| a.id != entity.id && a.user_id == entity.user_id)
        {
            return Err(constraint("user already has an author profile"));
        }
        tables.authors.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.authors.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl AuthorRepository for InMemoryStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .authors
            .values()
            .find(|a| a.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn save(&self, entity: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .categories
            .values()
            .any(|c| c.id != entity.id && c.color == entity.color)
        {
            return Err(constraint(format!("color '{}' taken", entity.color)));
        }
        tables.categories.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.categories.remove(&id).ok_or(RepoError::NotFound)?;

        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut matches: Vec<&Category> = tables
            .categories
            .values()
            .filter(|c| c.matches_name(name))
            .collect();
        matches.sort_by_key(|c| c.id);
        Ok(matches.first().map(|c| (*c).clone()))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.color.cmp(&b.color));
        Ok(categories)
    }
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn save(&self, entity: Tag) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .tags
            .values()
            .any(|t| t.id != entity.id && t.slug == entity.slug)
        {
            return Err(constraint(format!("tag slug '{}' taken", entity.slug)));
        }
        for post in tables.posts.values_mut() {
            for tag in post.tags.iter_mut().filter(|t| t.id == entity.id) {
                *tag = entity.clone();
            }
        }
        tables.tags.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.tags.remove(&id).ok_or(RepoError::NotFound)?;

        for post in tables.posts.values_mut() {
            post.tags.retain(|t| t.id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.slug == slug).cloned())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, entity: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&entity.post_id) {
            return Err(constraint("comment references a missing post"));
        }
        tables.comments.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[async_trait]
impl BaseRepository<PostImage, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostImage>, RepoError> {
        Ok(self.tables.read().await.images.get(&id).cloned())
    }

    async fn save(&self, entity: PostImage) -> Result<PostImage, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&entity.post_id) {
            return Err(constraint("image references a missing post"));
        }
        tables.images.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.images.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ImageRepository for InMemoryStore {
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<PostImage>, RepoError> {
        let tables = self.tables.read().await;
        let mut images: Vec<PostImage> = tables
            .images
            .values()
            .filter(|i| i.post_id == post_id)
            .cloned()
            .collect();
        images.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(images)
    }
}

#[async_trait]
impl BaseRepository<NewsletterSubscriber, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NewsletterSubscriber>, RepoError> {
        Ok(self.tables.read().await.subscribers.get(&id).cloned())
    }

    async fn save(&self, entity: NewsletterSubscriber) -> Result<NewsletterSubscriber, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .subscribers
            .values()
            .any(|s| s.id != entity.id && s.email == entity.email)
        {
            return Err(constraint("email already subscribed"));
        }
        tables.subscribers.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .subscribers
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl NewsletterRepository for InMemoryStore {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<NewsletterSubscriber>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscribers
            .values()
            .find(|s| s.email == email)
            .cloned())
    }
}
