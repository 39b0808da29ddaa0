//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod mail;
mod repository;

pub use mail::{MailError, Mailer, OutgoingMail};
pub use repository::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, ImageRepository,
    NewsletterRepository, PostRepository, TagRepository, UserRepository,
};
