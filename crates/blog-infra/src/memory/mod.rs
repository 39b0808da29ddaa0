//! In-memory store - the fallback when no database is configured.
//!
//! One [`InMemoryStore`] implements every repository port over a set of
//! hash maps behind a single async `RwLock`, and mirrors the relational
//! rules of the PostgreSQL schema: unique keys, foreign keys and cascades.
//! Data is lost on process restart.

mod catalog;
mod posts;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{
    Author, Category, Comment, NewsletterSubscriber, Post, PostImage, Tag, User,
};
use blog_core::service::Repositories;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    authors: HashMap<Uuid, Author>,
    categories: HashMap<Uuid, Category>,
    tags: HashMap<Uuid, Tag>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    images: HashMap<Uuid, PostImage>,
    subscribers: HashMap<Uuid, NewsletterSubscriber>,
}

impl Tables {
    /// Remove a post and everything that belongs to it.
    fn remove_post(&mut self, id: Uuid) -> Option<Post> {
        let post = self.posts.remove(&id)?;
        self.comments.retain(|_, c| c.post_id != id);
        self.images.retain(|_, i| i.post_id != id);
        Some(post)
    }
}

pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Every repository port, backed by this store.
    pub fn repositories(self: Arc<Self>) -> Repositories {
        Repositories {
            posts: self.clone(),
            categories: self.clone(),
            tags: self.clone(),
            comments: self.clone(),
            images: self.clone(),
            users: self.clone(),
            authors: self.clone(),
            subscribers: self,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
