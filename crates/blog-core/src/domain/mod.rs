//! Domain entities - the core business objects.

mod category;
mod comment;
mod image;
mod newsletter;
pub(crate) mod post;
mod summary;
mod tag;
mod user;

pub use category::{Category, CategoryRef, CategoryTranslation, validate_color};
pub use comment::Comment;
pub use image::PostImage;
pub use newsletter::NewsletterSubscriber;
pub use post::{Post, PostStatus, PostTranslation, post_path};
pub use summary::{ArchiveMonth, PostSummary};
pub use tag::Tag;
pub use user::{Author, User};
