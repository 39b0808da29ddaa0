use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

use blog_core::service::Repositories;

use super::category_repo::PostgresCategoryRepository;
use super::post_repo::PostgresPostRepository;
use super::postgres_repo::{
    PostgresAuthorRepository, PostgresCommentRepository, PostgresImageRepository,
    PostgresNewsletterRepository, PostgresTagRepository, PostgresUserRepository,
};

/// Configuration for the blog database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Open the connection pool.
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, DbErr> {
    tracing::info!("Initializing database connection...");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .to_owned();

    let db = Database::connect(opts).await?;
    tracing::info!("Database connected (pool: {})", config.max_connections);

    Ok(db)
}

/// Every repository backed by the same pool.
pub fn postgres_repositories(db: DbConn) -> Repositories {
    Repositories {
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
        tags: Arc::new(PostgresTagRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db.clone())),
        images: Arc::new(PostgresImageRepository::new(db.clone())),
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        authors: Arc::new(PostgresAuthorRepository::new(db.clone())),
        subscribers: Arc::new(PostgresNewsletterRepository::new(db)),
    }
}
