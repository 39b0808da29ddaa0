use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr, Value};
use uuid::Uuid;

use blog_core::domain::{Comment, Tag};
use blog_core::error::RepoError;
use blog_core::i18n::Locale;
use blog_core::ports::{
    BaseRepository, CommentRepository, NewsletterRepository, PostRepository, TagRepository,
};
use blog_core::search::PostFilter;

use super::entity::{comment, newsletter_subscriber, tag};
use super::post_repo::PostgresPostRepository;
use super::postgres_base::map_db_err;
use super::postgres_repo::{
    PostgresCommentRepository, PostgresNewsletterRepository, PostgresTagRepository, mask_email,
};

fn english() -> Locale {
    Locale {
        language: "en".to_string(),
        fallback: "en".to_string(),
    }
}

#[tokio::test]
async fn test_find_tag_by_slug() {
    let tag_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![tag::Model {
            id: tag_id,
            name: "Cane".to_owned(),
            slug: "cane".to_owned(),
        }]])
        .into_connection();

    let repo = PostgresTagRepository::new(db);
    let tag = repo.find_by_slug("cane").await.unwrap().unwrap();

    assert_eq!(tag.id, tag_id);
    assert_eq!(tag.name, "Cane");
}

#[tokio::test]
async fn test_save_inserts_missing_entity() {
    let tag = Tag::new("Reed Making");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            Vec::<tag::Model>::new(),
            vec![tag::Model {
                id: tag.id,
                name: tag.name.clone(),
                slug: tag.slug.clone(),
            }],
        ])
        .into_connection();

    let repo = PostgresTagRepository::new(db);
    let saved: Tag = repo.save(tag.clone()).await.unwrap();

    assert_eq!(saved, tag);
    assert_eq!(saved.slug, "reed-making");
}

#[tokio::test]
async fn test_delete_missing_entity_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresTagRepository::new(db);
    let result = BaseRepository::<Tag, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_active_comments_map_to_domain() {
    let post_id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![comment::Model {
            id: Uuid::new_v4(),
            post_id,
            name: "Ana".to_owned(),
            email: "ana@example.com".to_owned(),
            body: "Great read".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
            active: true,
        }]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let comments: Vec<Comment> = repo.active_for_post(post_id).await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].post_id, post_id);
    assert!(comments[0].active);
}

#[tokio::test]
async fn test_find_subscriber_by_email() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![newsletter_subscriber::Model {
            id: Uuid::new_v4(),
            email: "reader@example.com".to_owned(),
            created_at: chrono::Utc::now().into(),
        }]])
        .into_connection();

    let repo = PostgresNewsletterRepository::new(db);
    let found = repo.find_by_email("reader@example.com").await.unwrap();

    assert_eq!(found.unwrap().email, "reader@example.com");
}

#[tokio::test]
async fn test_count_published_reads_count_column() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[BTreeMap::from([("count", Value::BigInt(Some(7)))])]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let count = repo
        .count_published(&PostFilter::Text("reed".to_string()), &english())
        .await
        .unwrap();

    assert_eq!(count, 7);
}

#[tokio::test]
async fn test_archive_months_map_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[
            BTreeMap::from([
                ("year", Value::Int(Some(2023))),
                ("month", Value::Int(Some(4))),
            ]),
            BTreeMap::from([
                ("year", Value::Int(Some(2023))),
                ("month", Value::Int(Some(1))),
            ]),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let months = repo.archive_months(12).await.unwrap();

    assert_eq!(months.len(), 2);
    assert_eq!((months[0].year, months[0].month), (2023, 4));
    assert_eq!((months[1].year, months[1].month), (2023, 1));
}

#[test]
fn test_unique_violation_maps_to_constraint() {
    let err = DbErr::Query(RuntimeErr::Internal(
        "duplicate key value violates unique constraint".to_string(),
    ));
    assert!(matches!(map_db_err(err), RepoError::Constraint(_)));

    let err = DbErr::Query(RuntimeErr::Internal("syntax error".to_string()));
    assert!(matches!(map_db_err(err), RepoError::Query(_)));
}

#[test]
fn test_mask_email() {
    assert_eq!(mask_email("reader@example.com"), "r***@example.com");
    assert_eq!(mask_email("a@example.com"), "***@example.com");
    assert_eq!(mask_email("not-an-email"), "***");
}
