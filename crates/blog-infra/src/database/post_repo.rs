//! PostgreSQL post repository.
//!
//! Listings are raw SQL: each row resolves its title and slug for the
//! requested language (then the fallback language, then any translation),
//! and text search uses `pg_trgm`'s `similarity()` on that title.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, DbConn, EntityTrait,
    FromQueryResult, ModelTrait, QueryFilter, QueryOrder, Statement, TransactionTrait, Value,
    prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use blog_core::domain::{ArchiveMonth, Post, PostStatus, PostSummary, Tag};
use blog_core::error::RepoError;
use blog_core::i18n::Locale;
use blog_core::ports::{BaseRepository, PostRepository};
use blog_core::related::RelatedCandidate;
use blog_core::search::{PostFilter, PostOrdering};
use blog_core::similarity::SIMILARITY_THRESHOLD;

use super::category_repo::load_categories;
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::post_translation::{self, Entity as TranslationEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::postgres_base::map_db_err;

const PUBLISHED: &str = "published";

/// Positional parameter collector for hand-written statements.
#[derive(Default)]
struct Params {
    values: Vec<Value>,
}

impl Params {
    fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    fn statement(self, sql: String) -> Statement {
        Statement::from_sql_and_values(DbBackend::Postgres, sql, self.values)
    }
}

/// `FROM` clause shared by every listing, with `$1`/`$2` bound to the
/// locale's language and fallback.
fn listing_from(params: &mut Params, locale: &Locale) -> String {
    let language = params.bind(locale.language.clone());
    let fallback = params.bind(locale.fallback.clone());
    format!(
        "FROM posts p \
         JOIN users u ON u.id = p.author_id \
         LEFT JOIN post_translations t ON t.post_id = p.id AND t.language = {language} \
         LEFT JOIN post_translations f ON f.post_id = p.id AND f.language = {fallback} \
         JOIN LATERAL (SELECT x.title, x.slug FROM post_translations x \
             WHERE x.post_id = p.id ORDER BY x.language LIMIT 1) a ON TRUE \
         WHERE p.status = '{PUBLISHED}'"
    )
}

const TITLE: &str = "COALESCE(t.title, f.title, a.title)";

fn filter_clause(params: &mut Params, filter: &PostFilter) -> String {
    match filter {
        PostFilter::All => String::new(),
        PostFilter::Text(query) => {
            let query = params.bind(query.clone());
            let threshold = params.bind(SIMILARITY_THRESHOLD);
            // float4 score widened here, so an exact 0.1 passes
            format!(" AND similarity({TITLE}, {query})::float8 > {threshold}")
        }
        PostFilter::Date { year, month } => {
            let year = params.bind(*year);
            let month = params.bind(*month as i32);
            format!(
                " AND EXTRACT(YEAR FROM p.publish AT TIME ZONE 'UTC')::int4 = {year} \
                  AND EXTRACT(MONTH FROM p.publish AT TIME ZONE 'UTC')::int4 = {month}"
            )
        }
        PostFilter::Tag(tag_id) => {
            let tag_id = params.bind(*tag_id);
            format!(
                " AND EXISTS (SELECT 1 FROM post_tags pt \
                   WHERE pt.post_id = p.id AND pt.tag_id = {tag_id})"
            )
        }
        PostFilter::Category(category_id) => {
            let category_id = params.bind(*category_id);
            format!(" AND p.category_id = {category_id}")
        }
    }
}

fn order_clause(ordering: PostOrdering) -> &'static str {
    match ordering {
        PostOrdering::Relevance => "similarity DESC, p.publish DESC, p.id",
        PostOrdering::NewestFirst => "p.publish DESC, p.id",
        PostOrdering::OldestFirst => "p.publish ASC, p.id",
        PostOrdering::EarliestCreated => "p.created_at ASC, p.id",
        PostOrdering::MostVisited => "p.visits DESC, p.publish DESC, p.id",
        PostOrdering::MostCommented => "comment_count DESC, p.publish DESC, p.id",
    }
}

/// Select list of a summary row. `similarity` is only computed for text
/// searches.
fn summary_columns(params: &mut Params, filter: &PostFilter) -> String {
    let similarity = match filter {
        PostFilter::Text(query) => {
            let query = params.bind(query.clone());
            format!("similarity({TITLE}, {query})::float8")
        }
        _ => "NULL::float8".to_string(),
    };
    format!(
        "p.id, {TITLE} AS title, COALESCE(t.slug, f.slug, a.slug) AS slug, \
         p.publish, u.username AS author, p.category_id, p.visits, \
         (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id AND c.active) AS comment_count, \
         {similarity} AS similarity"
    )
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    id: Uuid,
    title: String,
    slug: String,
    publish: DateTimeWithTimeZone,
    author: String,
    category_id: Option<Uuid>,
    visits: i64,
    comment_count: i64,
    similarity: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct RelatedRow {
    id: Uuid,
    title: String,
    slug: String,
    publish: DateTimeWithTimeZone,
    author: String,
    category_id: Option<Uuid>,
    visits: i64,
    comment_count: i64,
    similarity: Option<f64>,
    shared_tags: i64,
}

impl RelatedRow {
    fn split(self) -> (SummaryRow, i64) {
        (
            SummaryRow {
                id: self.id,
                title: self.title,
                slug: self.slug,
                publish: self.publish,
                author: self.author,
                category_id: self.category_id,
                visits: self.visits,
                comment_count: self.comment_count,
                similarity: self.similarity,
            },
            self.shared_tags,
        )
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct ArchiveRow {
    year: i32,
    month: i32,
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Tags of each post, by name.
    async fn load_tags<C>(db: &C, post_ids: Vec<Uuid>) -> Result<HashMap<Uuid, Vec<Tag>>, RepoError>
    where
        C: ConnectionTrait,
    {
        let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(tags);
        }

        let links = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids))
            .find_also_related(TagEntity)
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await
            .map_err(map_db_err)?;

        for (link, tag) in links {
            if let Some(tag) = tag {
                tags.entry(link.post_id).or_default().push(tag.into());
            }
        }

        Ok(tags)
    }

    async fn hydrate_summaries(
        &self,
        rows: Vec<SummaryRow>,
        locale: &Locale,
    ) -> Result<Vec<PostSummary>, RepoError> {
        let category_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.category_id).collect();
        let categories = load_categories(&self.db, category_ids).await?;
        let mut tags = Self::load_tags(&self.db, rows.iter().map(|r| r.id).collect()).await?;

        Ok(rows
            .into_iter()
            .map(|row| PostSummary {
                id: row.id,
                title: row.title,
                slug: row.slug,
                publish: row.publish.into(),
                author: row.author,
                category: row
                    .category_id
                    .and_then(|id| categories.get(&id))
                    .and_then(|c| c.localized(locale)),
                tags: tags.remove(&row.id).unwrap_or_default(),
                visits: row.visits,
                comment_count: row.comment_count,
                similarity: row.similarity,
            })
            .collect())
    }

    async fn hydrate(&self, model: post::Model) -> Result<Post, RepoError> {
        let translations = model
            .find_related(TranslationEntity)
            .order_by_asc(post_translation::Column::Language)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        let tags = Self::load_tags(&self.db, vec![model.id])
            .await?
            .remove(&model.id)
            .unwrap_or_default();

        let status = PostStatus::parse(&model.status)
            .ok_or_else(|| RepoError::Query(format!("unknown post status {}", model.status)))?;

        Ok(Post {
            id: model.id,
            author_id: model.author_id,
            category_id: model.category_id,
            status,
            publish: model.publish.into(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            visits: model.visits,
            translations: translations.into_iter().map(Into::into).collect(),
            tags,
        })
    }

    /// A translation slug of `post` already taken by another post published
    /// the same day in the same language.
    async fn slug_conflict<C>(db: &C, post: &Post) -> Result<Option<String>, RepoError>
    where
        C: ConnectionTrait,
    {
        for translation in &post.translations {
            let mut params = Params::default();
            let language = params.bind(translation.language.clone());
            let slug = params.bind(translation.slug.clone());
            let date = params.bind(post.publish_date());
            let id = params.bind(post.id);
            let sql = format!(
                "SELECT COUNT(*) AS count FROM post_translations x \
                 JOIN posts p ON p.id = x.post_id \
                 WHERE x.language = {language} AND x.slug = {slug} \
                   AND (p.publish AT TIME ZONE 'UTC')::date = {date} AND p.id <> {id}"
            );
            let taken = CountRow::find_by_statement(params.statement(sql))
                .one(db)
                .await
                .map_err(map_db_err)?
                .is_some_and(|row| row.count > 0);
            if taken {
                return Ok(Some(translation.slug.clone()));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match model {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        if let Some(slug) = Self::slug_conflict(&txn, &entity).await? {
            return Err(RepoError::Constraint(format!(
                "slug '{slug}' already used on {}",
                entity.publish_date()
            )));
        }

        let row = post::ActiveModel::from(&entity);
        let exists = PostEntity::find_by_id(entity.id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .is_some();
        if exists {
            row.update(&txn).await.map_err(map_db_err)?;
        } else {
            row.insert(&txn).await.map_err(map_db_err)?;
        }

        TranslationEntity::delete_many()
            .filter(post_translation::Column::PostId.eq(entity.id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        for translation in &entity.translations {
            post_translation::ActiveModel::for_post(entity.id, translation)
                .insert(&txn)
                .await
                .map_err(map_db_err)?;
        }

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(entity.id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        for tag in &entity.tags {
            post_tag::ActiveModel {
                post_id: sea_orm::Set(entity.id),
                tag_id: sea_orm::Set(tag.id),
            }
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(post_id = %entity.id, status = entity.status.as_str(), "Post saved");
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count_published(&self, filter: &PostFilter, locale: &Locale) -> Result<u64, RepoError> {
        let mut params = Params::default();
        let from = listing_from(&mut params, locale);
        let filter = filter_clause(&mut params, filter);
        let sql = format!("SELECT COUNT(*) AS count {from}{filter}");

        let row = CountRow::find_by_statement(params.statement(sql))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.map(|r| r.count.max(0) as u64).unwrap_or(0))
    }

    async fn list_published(
        &self,
        filter: &PostFilter,
        ordering: PostOrdering,
        locale: &Locale,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostSummary>, RepoError> {
        let mut params = Params::default();
        let from = listing_from(&mut params, locale);
        let columns = summary_columns(&mut params, filter);
        let where_filter = filter_clause(&mut params, filter);
        let limit = params.bind(limit as i64);
        let offset = params.bind(offset as i64);
        let sql = format!(
            "SELECT {columns} {from}{where_filter} ORDER BY {} LIMIT {limit} OFFSET {offset}",
            order_clause(ordering)
        );

        let rows = SummaryRow::find_by_statement(params.statement(sql))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        self.hydrate_summaries(rows, locale).await
    }

    async fn find_published_by_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let mut params = Params::default();
        let date = params.bind(date);
        let slug = params.bind(slug.to_string());
        let sql = format!(
            "SELECT p.* FROM posts p \
             WHERE p.status = '{PUBLISHED}' \
               AND (p.publish AT TIME ZONE 'UTC')::date = {date} \
               AND EXISTS (SELECT 1 FROM post_translations x \
                   WHERE x.post_id = p.id AND x.slug = {slug}) \
             ORDER BY p.id LIMIT 1"
        );

        let model = PostEntity::find()
            .from_raw_sql(params.statement(sql))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match model {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_published(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .filter(post::Column::Status.eq(PUBLISHED))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match model {
            Some(model) => Ok(Some(self.hydrate(model).await?)),
            None => Ok(None),
        }
    }

    async fn related_candidates(
        &self,
        post_id: Uuid,
        locale: &Locale,
        limit: u64,
    ) -> Result<Vec<RelatedCandidate>, RepoError> {
        let mut params = Params::default();
        let from = listing_from(&mut params, locale);
        let columns = summary_columns(&mut params, &PostFilter::All);
        let source = params.bind(post_id);
        let limit = params.bind(limit as i64);
        let shared = format!(
            "(SELECT COUNT(*) FROM post_tags pt \
              JOIN post_tags src ON src.tag_id = pt.tag_id \
              WHERE pt.post_id = p.id AND src.post_id = {source})"
        );
        let sql = format!(
            "SELECT {columns}, {shared} AS shared_tags {from} \
             AND p.id <> {source} AND {shared} > 0 \
             ORDER BY shared_tags DESC, p.publish DESC, p.id LIMIT {limit}"
        );

        let rows = RelatedRow::find_by_statement(params.statement(sql))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let (rows, shared): (Vec<SummaryRow>, Vec<i64>) =
            rows.into_iter().map(RelatedRow::split).unzip();
        let summaries = self.hydrate_summaries(rows, locale).await?;

        Ok(summaries
            .into_iter()
            .zip(shared)
            .map(|(post, shared_tags)| RelatedCandidate {
                post,
                shared_tags: shared_tags.max(0) as u32,
            })
            .collect())
    }

    async fn increment_visits(&self, post_id: Uuid) -> Result<(), RepoError> {
        PostEntity::update_many()
            .col_expr(post::Column::Visits, Expr::col(post::Column::Visits).add(1))
            .filter(post::Column::Id.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn archive_months(&self, limit: u64) -> Result<Vec<ArchiveMonth>, RepoError> {
        let mut params = Params::default();
        let limit = params.bind(limit as i64);
        let sql = format!(
            "SELECT DISTINCT \
                EXTRACT(YEAR FROM p.publish AT TIME ZONE 'UTC')::int4 AS year, \
                EXTRACT(MONTH FROM p.publish AT TIME ZONE 'UTC')::int4 AS month \
             FROM posts p WHERE p.status = '{PUBLISHED}' \
             ORDER BY year DESC, month DESC LIMIT {limit}"
        );

        let rows = ArchiveRow::find_by_statement(params.statement(sql))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|r| ArchiveMonth {
                year: r.year,
                month: r.month as u32,
            })
            .collect())
    }
}
