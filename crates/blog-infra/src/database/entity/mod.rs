//! SeaORM entities, one per table.

pub mod author;
pub mod category;
pub mod category_translation;
pub mod comment;
pub mod newsletter_subscriber;
pub mod post;
pub mod post_image;
pub mod post_tag;
pub mod post_translation;
pub mod tag;
pub mod user;
