//! Request-level use cases, orchestrating the ports.
//!
//! Handlers build a [`SearchRequest`] (or a form) and call one method here;
//! each method is stateless and only touches the repositories it needs.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::content::{render_markdown, truncate_words};
use crate::domain::{
    ArchiveMonth, CategoryRef, Comment, NewsletterSubscriber, Post, PostImage, PostSummary,
    PostTranslation, Tag,
};
use crate::error::{DomainError, RepoError};
use crate::forms::{CommentForm, FieldErrors, FormOutcome, NewsletterForm, ShareForm};
use crate::i18n::{LanguageConfig, Locale};
use crate::pagination::{DEFAULT_INDEX_PAGE_SIZE, DEFAULT_SEARCH_PAGE_SIZE, Page, Paginator};
use crate::ports::{
    AuthorRepository, CategoryRepository, CommentRepository, ImageRepository, Mailer,
    NewsletterRepository, PostRepository, TagRepository, UserRepository,
};
use crate::related::{RELATED_POSTS_LIMIT, rank_related};
use crate::search::{PostFilter, PostOrdering, SearchRequest, resolve_ordering};

/// Tags shown per post in listings.
pub const SUMMARY_TAG_LIMIT: usize = 2;

/// Headline posts shown above the index listing.
pub const HEADLINE_POSTS: u64 = 3;

/// Entries in the syndication feed.
pub const FEED_LENGTH: u64 = 5;

/// Words kept in a feed entry summary.
pub const FEED_SUMMARY_WORDS: usize = 30;

/// Posts per sidebar widget.
pub const SIDEBAR_POSTS: u64 = 5;

/// Archive months listed in the sidebar.
pub const ARCHIVE_MONTHS: u64 = 12;

/// Tunables of the blog.
#[derive(Debug, Clone)]
pub struct BlogSettings {
    pub search_page_size: u64,
    pub index_page_size: u64,
    /// Sender address of outgoing mail.
    pub mail_from: String,
    pub languages: LanguageConfig,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            search_page_size: DEFAULT_SEARCH_PAGE_SIZE,
            index_page_size: DEFAULT_INDEX_PAGE_SIZE,
            mail_from: "blog@localhost".to_string(),
            languages: LanguageConfig::default(),
        }
    }
}

/// Every repository the service talks to.
#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub images: Arc<dyn ImageRepository>,
    pub users: Arc<dyn UserRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub subscribers: Arc<dyn NewsletterRepository>,
}

/// A page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub request: SearchRequest,
    pub placeholder: String,
    pub page: Page<PostSummary>,
}

/// The front page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexListing {
    pub page: Page<PostSummary>,
    pub headline: Vec<PostSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub username: String,
    pub bio: Option<String>,
    pub credentials: Option<String>,
}

/// Everything the detail page shows.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: Post,
    pub translation: PostTranslation,
    pub body_html: String,
    pub author: AuthorView,
    pub category: Option<CategoryRef>,
    pub images: Vec<PostImage>,
    pub comments: Vec<Comment>,
    pub related: Vec<PostSummary>,
}

/// The post a share form refers to.
#[derive(Debug, Clone, Serialize)]
pub struct SharedPost {
    pub id: Uuid,
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareOutcome {
    pub post: SharedPost,
    pub sent: bool,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub id: Uuid,
    pub title: String,
    pub path: String,
    pub publish: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub summary: String,
    pub content_html: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sidebar {
    pub latest: Vec<PostSummary>,
    pub most_commented: Vec<PostSummary>,
    pub popular: Vec<PostSummary>,
    pub archive: Vec<ArchiveMonth>,
    pub categories: Vec<CategoryRef>,
    pub total_posts: u64,
}

/// The blog's use cases.
pub struct BlogService {
    repos: Repositories,
    mailer: Arc<dyn Mailer>,
    settings: BlogSettings,
}

impl BlogService {
    pub fn new(repos: Repositories, mailer: Arc<dyn Mailer>, settings: BlogSettings) -> Self {
        Self {
            repos,
            mailer,
            settings,
        }
    }

    pub fn settings(&self) -> &BlogSettings {
        &self.settings
    }

    /// Locale for a request's `Accept-Language` header.
    pub fn locale(&self, accept_language: Option<&str>) -> Locale {
        self.settings.languages.negotiate(accept_language)
    }

    /// Run a search. Unknown tags and categories give an empty page.
    pub async fn search(
        &self,
        request: SearchRequest,
        order_by: Option<&str>,
        page: Option<&str>,
        locale: &Locale,
    ) -> Result<SearchResults, DomainError> {
        let ordering = resolve_ordering(&request, order_by);
        let paginator = Paginator::new(self.settings.search_page_size);

        let page = match self.resolve_filter(&request).await? {
            Some(filter) => {
                self.paginate(&filter, ordering, locale, paginator, page)
                    .await?
            }
            None => Page::empty(paginator.page_size()),
        };

        tracing::debug!(
            kind = request.kind(),
            count = page.window.count,
            page = page.window.number,
            "Search resolved"
        );

        Ok(SearchResults {
            placeholder: request.placeholder(),
            request,
            page,
        })
    }

    /// Front page: every published post, oldest first unless `order_by=newest`.
    pub async fn index(
        &self,
        order_by: Option<&str>,
        page: Option<&str>,
        locale: &Locale,
    ) -> Result<IndexListing, DomainError> {
        let ordering = match order_by {
            Some("newest") => PostOrdering::NewestFirst,
            _ => PostOrdering::OldestFirst,
        };
        let paginator = Paginator::new(self.settings.index_page_size);
        let page = self
            .paginate(&PostFilter::All, ordering, locale, paginator, page)
            .await?;
        let headline = self
            .top(PostOrdering::EarliestCreated, locale, HEADLINE_POSTS)
            .await?;

        Ok(IndexListing { page, headline })
    }

    /// Detail page. Counts a visit.
    pub async fn post_detail(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
        locale: &Locale,
    ) -> Result<PostView, DomainError> {
        let mut post = self.find_by_date_slug(year, month, day, slug).await?;

        self.repos.posts.increment_visits(post.id).await?;
        post.visits += 1;

        let translation = post
            .translation(locale)
            .cloned()
            .ok_or_else(|| DomainError::Internal(format!("post {} has no translation", post.id)))?;

        let category = match post.category_id {
            Some(id) => self
                .repos
                .categories
                .find_by_id(id)
                .await?
                .and_then(|c| c.localized(locale)),
            None => None,
        };

        let author = self.author_view(post.author_id).await?;
        let images = self.repos.images.for_post(post.id).await?;
        let comments = self.repos.comments.active_for_post(post.id).await?;

        let candidates = self
            .repos
            .posts
            .related_candidates(post.id, locale, RELATED_POSTS_LIMIT as u64)
            .await?;
        let related = rank_related(post.id, candidates, RELATED_POSTS_LIMIT)
            .into_iter()
            .map(trim_tags)
            .collect();

        Ok(PostView {
            body_html: render_markdown(&translation.body),
            translation,
            author,
            category,
            images,
            comments,
            related,
            post,
        })
    }

    /// Add a visitor comment to a published post.
    pub async fn add_comment(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
        form: CommentForm,
    ) -> Result<FormOutcome<Comment>, DomainError> {
        let post = self.find_by_date_slug(year, month, day, slug).await?;

        let form = match form.clean() {
            Ok(form) => form,
            Err(errors) => return Ok(FormOutcome::rejected(errors)),
        };

        let comment = Comment::new(post.id, form.name, form.email, form.body);
        let saved = self.repos.comments.save(comment).await?;
        tracing::info!(post_id = %post.id, comment_id = %saved.id, "Comment added");

        Ok(FormOutcome::accepted(saved))
    }

    /// The post behind a share form.
    pub async fn share_target(
        &self,
        post_id: Uuid,
        locale: &Locale,
    ) -> Result<SharedPost, DomainError> {
        let post = self
            .repos
            .posts
            .find_published(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id.to_string()))?;

        let translation = post
            .translation(locale)
            .ok_or_else(|| DomainError::Internal(format!("post {} has no translation", post.id)))?;

        Ok(SharedPost {
            id: post.id,
            title: translation.title.clone(),
            path: post.absolute_path(&translation.slug),
        })
    }

    /// Validate a share form and mail the recommendation.
    ///
    /// `base_url` is the scheme and host the post link is built on. A
    /// transport failure is logged and reported as `sent = false`.
    pub async fn share_post(
        &self,
        post_id: Uuid,
        form: ShareForm,
        base_url: &str,
        locale: &Locale,
    ) -> Result<ShareOutcome, DomainError> {
        let post = self.share_target(post_id, locale).await?;

        let form = match form.clean() {
            Ok(form) => form,
            Err(errors) => {
                return Ok(ShareOutcome {
                    post,
                    sent: false,
                    errors,
                });
            }
        };

        let url = format!("{}{}", base_url.trim_end_matches('/'), post.path);
        let mail = form.compose(&self.settings.mail_from, &post.title, &url);

        let sent = match self.mailer.send(&mail).await {
            Ok(()) => {
                tracing::info!(post_id = %post.id, "Share email sent");
                true
            }
            Err(e) => {
                tracing::error!(post_id = %post.id, error = %e, "Share email failed");
                false
            }
        };

        Ok(ShareOutcome {
            post,
            sent,
            errors: FieldErrors::new(),
        })
    }

    /// Sign up for the newsletter. Signing up twice is not an error.
    pub async fn subscribe(
        &self,
        form: NewsletterForm,
    ) -> Result<FormOutcome<NewsletterSubscriber>, DomainError> {
        let form = match form.clean() {
            Ok(form) => form,
            Err(errors) => return Ok(FormOutcome::rejected(errors)),
        };

        if let Some(existing) = self.repos.subscribers.find_by_email(&form.email).await? {
            return Ok(FormOutcome::accepted(existing));
        }

        match self
            .repos
            .subscribers
            .save(NewsletterSubscriber::new(form.email.clone()))
            .await
        {
            Ok(saved) => {
                tracing::info!(subscriber_id = %saved.id, "Newsletter subscriber added");
                Ok(FormOutcome::accepted(saved))
            }
            // Lost a race with a concurrent signup for the same address.
            Err(RepoError::Constraint(_)) => self
                .repos
                .subscribers
                .find_by_email(&form.email)
                .await?
                .map(FormOutcome::accepted)
                .ok_or_else(|| DomainError::Internal("subscriber vanished".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Latest posts for the syndication feed.
    pub async fn feed(&self, locale: &Locale) -> Result<Vec<FeedItem>, DomainError> {
        let latest = self
            .repos
            .posts
            .list_published(
                &PostFilter::All,
                PostOrdering::NewestFirst,
                locale,
                0,
                FEED_LENGTH,
            )
            .await?;

        let mut items = Vec::with_capacity(latest.len());
        for summary in latest {
            let Some(post) = self.repos.posts.find_published(summary.id).await? else {
                continue;
            };
            let Some(translation) = post.translation(locale) else {
                continue;
            };
            items.push(FeedItem {
                id: post.id,
                title: translation.title.clone(),
                path: post.absolute_path(&translation.slug),
                publish: post.publish,
                updated: post.updated_at,
                summary: truncate_words(&translation.body, FEED_SUMMARY_WORDS),
                content_html: render_markdown(&translation.body),
                tags: post.tags.clone(),
            });
        }

        Ok(items)
    }

    /// Sidebar widgets.
    pub async fn sidebar(&self, locale: &Locale) -> Result<Sidebar, DomainError> {
        let latest = self
            .top(PostOrdering::NewestFirst, locale, SIDEBAR_POSTS)
            .await?;
        let most_commented = self
            .top(PostOrdering::MostCommented, locale, SIDEBAR_POSTS)
            .await?;
        let popular = self
            .top(PostOrdering::MostVisited, locale, SIDEBAR_POSTS)
            .await?;
        let archive = self.repos.posts.archive_months(ARCHIVE_MONTHS).await?;
        let total_posts = self
            .repos
            .posts
            .count_published(&PostFilter::All, locale)
            .await?;

        let mut categories: Vec<CategoryRef> = self
            .repos
            .categories
            .list_all()
            .await?
            .iter()
            .filter_map(|c| c.localized(locale))
            .collect();
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        Ok(Sidebar {
            latest,
            most_commented,
            popular,
            archive,
            categories,
            total_posts,
        })
    }

    async fn resolve_filter(
        &self,
        request: &SearchRequest,
    ) -> Result<Option<PostFilter>, DomainError> {
        let filter = match request {
            SearchRequest::Text { query } => {
                let query = query.trim();
                (!query.is_empty()).then(|| PostFilter::Text(query.to_string()))
            }
            SearchRequest::Date { year, month } => Some(PostFilter::Date {
                year: *year,
                month: *month,
            }),
            SearchRequest::Tag { slug } => {
                let tag = self.repos.tags.find_by_slug(slug).await?;
                if tag.is_none() {
                    tracing::debug!(tag = %slug, "Unknown tag, empty result");
                }
                tag.map(|t| PostFilter::Tag(t.id))
            }
            SearchRequest::Category { name } => {
                let category = self.repos.categories.find_by_name(name).await?;
                if category.is_none() {
                    tracing::debug!(category = %name, "Unknown category, empty result");
                }
                category.map(|c| PostFilter::Category(c.id))
            }
            SearchRequest::None => None,
        };
        Ok(filter)
    }

    async fn paginate(
        &self,
        filter: &PostFilter,
        ordering: PostOrdering,
        locale: &Locale,
        paginator: Paginator,
        page_param: Option<&str>,
    ) -> Result<Page<PostSummary>, DomainError> {
        let count = self.repos.posts.count_published(filter, locale).await?;
        let window = paginator.resolve(page_param, count);

        let items = if count == 0 {
            Vec::new()
        } else {
            self.repos
                .posts
                .list_published(filter, ordering, locale, window.offset(), window.limit())
                .await?
        };

        Ok(Page::new(items, window).map(trim_tags))
    }

    async fn top(
        &self,
        ordering: PostOrdering,
        locale: &Locale,
        limit: u64,
    ) -> Result<Vec<PostSummary>, DomainError> {
        let posts = self
            .repos
            .posts
            .list_published(&PostFilter::All, ordering, locale, 0, limit)
            .await?;
        Ok(posts.into_iter().map(trim_tags).collect())
    }

    async fn find_by_date_slug(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
    ) -> Result<Post, DomainError> {
        let not_found = || DomainError::not_found("post", format!("{year}/{month}/{day}/{slug}"));

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(not_found)?;
        self.repos
            .posts
            .find_published_by_slug(date, slug)
            .await?
            .ok_or_else(not_found)
    }

    async fn author_view(&self, user_id: Uuid) -> Result<AuthorView, DomainError> {
        let user = self.repos.users.find_by_id(user_id).await?;
        let profile = self.repos.authors.find_by_user_id(user_id).await?;

        Ok(AuthorView {
            username: user.map(|u| u.username).unwrap_or_default(),
            bio: profile.as_ref().map(|a| a.bio.clone()),
            credentials: profile.map(|a| a.credentials),
        })
    }
}

fn trim_tags(mut post: PostSummary) -> PostSummary {
    post.tags.truncate(SUMMARY_TAG_LIMIT);
    post
}
