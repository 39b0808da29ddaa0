use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_translations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub language: String,
    pub title: String,
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for blog_core::domain::PostTranslation {
    fn from(model: Model) -> Self {
        Self {
            language: model.language,
            title: model.title,
            slug: model.slug,
            body: model.body,
        }
    }
}

impl ActiveModel {
    pub fn for_post(post_id: Uuid, translation: &blog_core::domain::PostTranslation) -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            post_id: Set(post_id),
            language: Set(translation.language.clone()),
            title: Set(translation.title.clone()),
            slug: Set(translation.slug.clone()),
            body: Set(translation.body.clone()),
        }
    }
}
