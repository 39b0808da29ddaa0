use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    /// Storage path, `blog/<post title>/<file name>`.
    pub image: String,
    pub source_or_author: Option<String>,
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

impl From<Model> for blog_core::domain::PostImage {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            name: model.name,
            image: model.image,
            source_or_author: model.source_or_author,
        }
    }
}

impl From<blog_core::domain::PostImage> for ActiveModel {
    fn from(image: blog_core::domain::PostImage) -> Self {
        Self {
            id: Set(image.id),
            post_id: Set(image.post_id),
            name: Set(image.name),
            image: Set(image.image),
            source_or_author: Set(image.source_or_author),
        }
    }
}
