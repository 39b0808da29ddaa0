//! PostgreSQL category repository. Categories are stored with their
//! translations, so save and load span two tables.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::Category;
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, CategoryRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::category_translation::{self, Entity as TranslationEntity};
use super::postgres_base::map_db_err;

pub struct PostgresCategoryRepository {
    db: DbConn,
}

impl PostgresCategoryRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn into_domain(model: category::Model, translations: Vec<category_translation::Model>) -> Category {
    Category {
        id: model.id,
        color: model.tag_color,
        translations: translations.into_iter().map(Into::into).collect(),
    }
}

/// Load the categories with the given ids, keyed by id.
pub(crate) async fn load_categories<C>(
    db: &C,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Category>, RepoError>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = CategoryEntity::find()
        .filter(category::Column::Id.is_in(ids))
        .find_with_related(TranslationEntity)
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(rows
        .into_iter()
        .map(|(model, translations)| (model.id, into_domain(model, translations)))
        .collect())
}

#[async_trait]
impl BaseRepository<Category, Uuid> for PostgresCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(load_categories(&self.db, vec![id]).await?.remove(&id))
    }

    async fn save(&self, entity: Category) -> Result<Category, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let row = category::ActiveModel {
            id: Set(entity.id),
            tag_color: Set(entity.color.clone()),
        };
        let exists = CategoryEntity::find_by_id(entity.id)
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
            .filter(category_translation::Column::CategoryId.eq(entity.id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        for translation in &entity.translations {
            category_translation::ActiveModel {
                id: Set(Uuid::new_v4()),
                category_id: Set(entity.id),
                language: Set(translation.language.clone()),
                name: Set(translation.name.clone()),
                slug: Set(translation.slug.clone()),
            }
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = CategoryEntity::delete_by_id(id)
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
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let translation = TranslationEntity::find()
            .filter(Expr::cust_with_values(
                "LOWER(name) = $1",
                [name.trim().to_lowercase()],
            ))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match translation {
            Some(t) => self.find_by_id(t.category_id).await,
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let rows = CategoryEntity::find()
            .order_by_asc(category::Column::TagColor)
            .find_with_related(TranslationEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(model, translations)| into_domain(model, translations))
            .collect())
    }
}
