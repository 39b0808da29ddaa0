use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "newsletter_subscribers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for blog_core::domain::NewsletterSubscriber {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            created_at: model.created_at.into(),
        }
    }
}

impl From<blog_core::domain::NewsletterSubscriber> for ActiveModel {
    fn from(subscriber: blog_core::domain::NewsletterSubscriber) -> Self {
        Self {
            id: Set(subscriber.id),
            email: Set(subscriber.email),
            created_at: Set(subscriber.created_at.into()),
        }
    }
}
