//! PostgreSQL persistence via SeaORM.

mod category_repo;
mod connections;
mod post_repo;
mod postgres_base;
mod postgres_repo;

pub mod entity;

pub use category_repo::PostgresCategoryRepository;
pub use connections::{DatabaseConfig, connect, postgres_repositories};
pub use post_repo::PostgresPostRepository;
pub use postgres_repo::{
    PostgresAuthorRepository, PostgresCommentRepository, PostgresImageRepository,
    PostgresNewsletterRepository, PostgresTagRepository, PostgresUserRepository,
};

#[cfg(test)]
mod tests;
