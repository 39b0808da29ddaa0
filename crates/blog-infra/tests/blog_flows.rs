//! End-to-end flows of the blog service over the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;

use blog_core::domain::{
    Author, Category, CategoryTranslation, Comment, Post, PostImage, PostStatus, PostTranslation,
    Tag, User,
};
use blog_core::error::RepoError;
use blog_core::forms::{CommentForm, NewsletterForm, ShareForm};
use blog_core::i18n::{LanguageConfig, Locale};
use blog_core::ports::{MailError, Mailer, OutgoingMail};
use blog_core::search::{PostFilter, SearchRequest};
use blog_core::service::Repositories;
use blog_core::{BlogService, BlogSettings, DomainError};
use blog_infra::{InMemoryStore, LoggingMailer};

const BODY: &str = "Scraping a reed is a slow craft. Every pass of the knife changes \
    the response, the pitch and the colour of the tone, so most players keep a \
    notebook of measurements and adjust them through the season as humidity \
    and temperature shift.";

struct BrokenMailer;

#[async_trait]
impl Mailer for BrokenMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

struct Fixture {
    repos: Repositories,
    mailer: Arc<LoggingMailer>,
    reeds: Category,
    posts: HashMap<&'static str, Post>,
}

impl Fixture {
    fn settings() -> BlogSettings {
        BlogSettings {
            mail_from: "blog@example.com".to_string(),
            ..BlogSettings::default()
        }
    }

    fn service(&self) -> BlogService {
        self.service_with(Self::settings())
    }

    fn service_with(&self, settings: BlogSettings) -> BlogService {
        BlogService::new(self.repos.clone(), self.mailer.clone(), settings)
    }

    fn post(&self, title: &str) -> &Post {
        &self.posts[title]
    }
}

fn english() -> Locale {
    LanguageConfig::default().default_locale()
}

fn spanish() -> Locale {
    LanguageConfig::default().negotiate(Some("es-ES,es;q=0.9"))
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap()
}

fn titles<'a>(posts: impl IntoIterator<Item = &'a blog_core::domain::PostSummary>) -> Vec<&'a str> {
    posts.into_iter().map(|p| p.title.as_str()).collect()
}

async fn seed() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let repos = store.repositories();

    let user = repos
        .users
        .save(User::new("vgb".to_string(), "vgb@example.com".to_string()))
        .await
        .unwrap();
    repos
        .authors
        .save(Author::new(
            user.id,
            "Oboist and reed maker".to_string(),
            "Principal oboe".to_string(),
        ))
        .await
        .unwrap();

    let reeds = Category::new("1A2B3C", CategoryTranslation::new("en", "Reeds"))
        .unwrap()
        .with_translation(CategoryTranslation::new("es", "Cañas"));
    repos.categories.save(reeds.clone()).await.unwrap();

    let mut tags = HashMap::new();
    for name in ["Cane", "Oboe", "Bassoon", "Travel"] {
        let tag = repos.tags.save(Tag::new(name)).await.unwrap();
        tags.insert(name, tag);
    }

    let specs: [(&str, DateTime<Utc>, &[&str], bool, PostStatus); 7] = [
        ("Intro to Reeds", at(2023, 1, 10), &["Cane", "Oboe"], true, PostStatus::Published),
        ("Reed Care Basics", at(2023, 2, 5), &["Cane", "Oboe", "Bassoon"], true, PostStatus::Published),
        ("Touring Schedule", at(2023, 2, 20), &["Travel"], false, PostStatus::Published),
        ("Cane Selection", at(2023, 3, 1), &["Cane"], false, PostStatus::Published),
        ("Gouging Machines", at(2023, 4, 1), &["Cane", "Oboe"], false, PostStatus::Published),
        ("Bassoon Reeds", at(2023, 4, 15), &["Bassoon", "Cane"], true, PostStatus::Published),
        ("Unreleased Notes", at(2023, 4, 20), &["Cane"], true, PostStatus::Draft),
    ];

    let mut posts = HashMap::new();
    for (title, publish, tag_names, categorised, status) in specs {
        let mut post = Post::new(user.id, PostTranslation::new("en", title, BODY))
            .publish_at(publish)
            .with_tags(tag_names.iter().map(|n| tags[n].clone()).collect());
        post.status = status;
        post.created_at = publish;
        post.updated_at = publish;
        if categorised {
            post = post.with_category(reeds.id);
        }
        if title == "Reed Care Basics" {
            post = post.with_translation(PostTranslation::new("es", "Cuidado de Cañas", BODY));
        }
        let saved = repos.posts.save(post).await.unwrap();
        posts.insert(title, saved);
    }

    Fixture {
        repos,
        mailer: Arc::new(LoggingMailer::new()),
        reeds,
        posts,
    }
}

fn text(query: &str) -> SearchRequest {
    SearchRequest::Text {
        query: query.to_string(),
    }
}

fn tag(slug: &str) -> SearchRequest {
    SearchRequest::Tag {
        slug: slug.to_string(),
    }
}

#[tokio::test]
async fn test_text_search_orders_by_similarity() {
    let blog = seed().await;
    let results = blog
        .service()
        .search(text("reed"), None, None, &english())
        .await
        .unwrap();

    assert_eq!(
        titles(&results.page.items),
        vec!["Reed Care Basics", "Bassoon Reeds", "Intro to Reeds"]
    );
    assert_eq!(results.placeholder, "reed");
    assert!(results.page.items.iter().all(|p| p.similarity.unwrap() > 0.1));
}

#[tokio::test]
async fn test_text_search_newest_order_override() {
    let blog = seed().await;
    let results = blog
        .service()
        .search(text("reed"), Some("newest"), None, &english())
        .await
        .unwrap();

    assert_eq!(
        titles(&results.page.items),
        vec!["Bassoon Reeds", "Reed Care Basics", "Intro to Reeds"]
    );
}

#[tokio::test]
async fn test_text_search_uses_translated_titles() {
    let blog = seed().await;
    let results = blog
        .service()
        .search(text("reed"), None, None, &spanish())
        .await
        .unwrap();

    assert_eq!(
        titles(&results.page.items),
        vec!["Bassoon Reeds", "Intro to Reeds"]
    );
}

#[tokio::test]
async fn test_unknown_tag_is_empty_not_error() {
    let blog = seed().await;
    let results = blog
        .service()
        .search(tag("no-such-tag"), None, Some("3"), &english())
        .await
        .unwrap();

    assert!(results.page.items.is_empty());
    assert_eq!(results.page.window.count, 0);
    assert_eq!(results.page.window.number, 1);
    assert_eq!(results.placeholder, "#no-such-tag");
}

#[tokio::test]
async fn test_tag_search_newest_first_unless_oldest() {
    let blog = seed().await;
    let service = blog.service();

    let newest = service
        .search(tag("bassoon"), None, None, &english())
        .await
        .unwrap();
    assert_eq!(
        titles(&newest.page.items),
        vec!["Bassoon Reeds", "Reed Care Basics"]
    );

    let oldest = service
        .search(tag("bassoon"), Some("oldest"), None, &english())
        .await
        .unwrap();
    assert_eq!(
        titles(&oldest.page.items),
        vec!["Reed Care Basics", "Bassoon Reeds"]
    );
}

#[rstest]
#[case("reeds")]
#[case("REEDS")]
#[case("cañas")]
#[case(" Reeds ")]
#[tokio::test]
async fn test_category_search_matches_any_translated_name(#[case] name: &str) {
    let blog = seed().await;
    let request = SearchRequest::Category {
        name: name.to_string(),
    };
    let results = blog
        .service()
        .search(request, None, None, &english())
        .await
        .unwrap();

    assert_eq!(
        titles(&results.page.items),
        vec!["Bassoon Reeds", "Reed Care Basics", "Intro to Reeds"]
    );
    assert_eq!(results.placeholder, format!("@{name}"));
}

#[tokio::test]
async fn test_date_search_matches_month() {
    let blog = seed().await;
    let request = SearchRequest::Date {
        year: 2023,
        month: 2,
    };
    let results = blog
        .service()
        .search(request, None, None, &english())
        .await
        .unwrap();

    assert_eq!(
        titles(&results.page.items),
        vec!["Touring Schedule", "Reed Care Basics"]
    );
}

#[tokio::test]
async fn test_empty_request_yields_empty_page() {
    let blog = seed().await;
    let results = blog
        .service()
        .search(SearchRequest::None, None, None, &english())
        .await
        .unwrap();

    assert!(results.page.items.is_empty());
    assert_eq!(results.page.window.num_pages, 1);
}

#[rstest]
#[case(None, 1)]
#[case(Some("abc"), 1)]
#[case(Some("2"), 2)]
#[case(Some("99"), 3)]
#[case(Some("99999999999999999999"), 3)]
#[case(Some("-4"), 1)]
#[case(Some("0"), 1)]
#[tokio::test]
async fn test_search_page_is_clamped(#[case] page: Option<&str>, #[case] expected: u64) {
    let blog = seed().await;
    let service = blog.service_with(BlogSettings {
        search_page_size: 2,
        ..Fixture::settings()
    });

    // Five published posts carry the cane tag.
    let results = service
        .search(tag("cane"), None, page, &english())
        .await
        .unwrap();

    assert_eq!(results.page.window.count, 5);
    assert_eq!(results.page.window.num_pages, 3);
    assert_eq!(results.page.window.number, expected);
    assert!(!results.page.items.is_empty());
}

#[tokio::test]
async fn test_drafts_are_never_listed() {
    let blog = seed().await;
    let count = blog
        .repos
        .posts
        .count_published(&PostFilter::All, &english())
        .await
        .unwrap();
    assert_eq!(count, 6);

    let results = blog
        .service()
        .search(text("unreleased notes"), None, None, &english())
        .await
        .unwrap();
    assert!(results.page.items.is_empty());
}

#[tokio::test]
async fn test_detail_related_posts() {
    let blog = seed().await;
    let view = blog
        .service()
        .post_detail(2023, 2, 5, "reed-care-basics", &english())
        .await
        .unwrap();

    assert_eq!(view.translation.title, "Reed Care Basics");
    assert_eq!(
        titles(&view.related),
        vec!["Bassoon Reeds", "Gouging Machines", "Intro to Reeds", "Cane Selection"]
    );
    assert!(view.related.iter().all(|p| p.id != view.post.id));
    assert!(view.related.iter().all(|p| p.tags.len() <= 2));
    assert_eq!(view.category.unwrap().name, "Reeds");
    assert_eq!(view.author.username, "vgb");
    assert_eq!(view.author.credentials.as_deref(), Some("Principal oboe"));
    assert!(view.body_html.starts_with("<p>"));
}

#[tokio::test]
async fn test_detail_by_translated_slug() {
    let blog = seed().await;
    let view = blog
        .service()
        .post_detail(2023, 2, 5, "cuidado-de-canas", &spanish())
        .await
        .unwrap();

    assert_eq!(view.translation.title, "Cuidado de Cañas");
    assert_eq!(view.category.unwrap().name, "Cañas");
}

#[tokio::test]
async fn test_detail_counts_visits() {
    let blog = seed().await;
    let service = blog.service();

    service
        .post_detail(2023, 1, 10, "intro-to-reeds", &english())
        .await
        .unwrap();
    let view = service
        .post_detail(2023, 1, 10, "intro-to-reeds", &english())
        .await
        .unwrap();

    assert_eq!(view.post.visits, 2);
}

#[rstest]
#[case(2023, 1, 11, "intro-to-reeds")]
#[case(2023, 2, 30, "intro-to-reeds")]
#[case(2023, 1, 10, "missing")]
#[case(2023, 4, 20, "unreleased-notes")]
#[tokio::test]
async fn test_detail_not_found(
    #[case] year: i32,
    #[case] month: u32,
    #[case] day: u32,
    #[case] slug: &str,
) {
    let blog = seed().await;
    let result = blog
        .service()
        .post_detail(year, month, day, slug, &english())
        .await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

fn share_form(email: &str) -> ShareForm {
    ShareForm {
        name: "Ana".to_string(),
        email: email.to_string(),
        to: "friend@example.com".to_string(),
        comments: "Worth it".to_string(),
    }
}

#[tokio::test]
async fn test_share_sends_recommendation() {
    let blog = seed().await;
    let post = blog.post("Reed Care Basics");
    let outcome = blog
        .service()
        .share_post(post.id, share_form("ana@example.com"), "http://blog.test/", &english())
        .await
        .unwrap();

    assert!(outcome.sent);
    assert!(outcome.errors.is_empty());

    let outbox = blog.mailer.outbox().await;
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].from, "blog@example.com");
    assert_eq!(outbox[0].to, vec!["friend@example.com".to_string()]);
    assert_eq!(outbox[0].subject, "Ana recommends you read Reed Care Basics");
    assert_eq!(
        outbox[0].body,
        "Read Reed Care Basics at http://blog.test/2023/2/5/reed-care-basics/\n\nAna's comments: Worth it"
    );
}

#[tokio::test]
async fn test_share_invalid_form_sends_nothing() {
    let blog = seed().await;
    let post = blog.post("Reed Care Basics");
    let outcome = blog
        .service()
        .share_post(post.id, share_form("not-an-email"), "http://blog.test", &english())
        .await
        .unwrap();

    assert!(!outcome.sent);
    assert!(outcome.errors.contains_key("email"));
    assert!(blog.mailer.outbox().await.is_empty());
}

#[tokio::test]
async fn test_share_draft_is_not_found() {
    let blog = seed().await;
    let post = blog.post("Unreleased Notes");
    let result = blog
        .service()
        .share_post(post.id, share_form("ana@example.com"), "http://blog.test", &english())
        .await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_share_transport_failure_reports_unsent() {
    let blog = seed().await;
    let service = BlogService::new(blog.repos.clone(), Arc::new(BrokenMailer), Fixture::settings());
    let post = blog.post("Intro to Reeds");

    let outcome = service
        .share_post(post.id, share_form("ana@example.com"), "http://blog.test", &english())
        .await
        .unwrap();

    assert!(!outcome.sent);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn test_comments_show_on_detail() {
    let blog = seed().await;
    let service = blog.service();

    let outcome = service
        .add_comment(
            2023,
            1,
            10,
            "intro-to-reeds",
            CommentForm {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                body: "Very helpful".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(outcome.is_accepted());

    let rejected = service
        .add_comment(2023, 1, 10, "intro-to-reeds", CommentForm::default())
        .await
        .unwrap();
    assert!(!rejected.is_accepted());
    assert!(rejected.errors.contains_key("body"));

    let view = service
        .post_detail(2023, 1, 10, "intro-to-reeds", &english())
        .await
        .unwrap();
    assert_eq!(view.comments.len(), 1);
    assert_eq!(view.comments[0].body, "Very helpful");
}

#[tokio::test]
async fn test_deleting_category_keeps_posts() {
    let blog = seed().await;
    blog.repos.categories.delete(blog.reeds.id).await.unwrap();

    let post = blog
        .repos
        .posts
        .find_by_id(blog.post("Intro to Reeds").id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(post.category_id, None);

    let results = blog
        .service()
        .search(
            SearchRequest::Category {
                name: "Reeds".to_string(),
            },
            None,
            None,
            &english(),
        )
        .await
        .unwrap();
    assert!(results.page.items.is_empty());
}

#[tokio::test]
async fn test_deleting_post_removes_comments_and_images() {
    let blog = seed().await;
    let post = blog.post("Cane Selection");

    let comment = blog
        .repos
        .comments
        .save(Comment::new(
            post.id,
            "Ana".to_string(),
            "ana@example.com".to_string(),
            "Nice".to_string(),
        ))
        .await
        .unwrap();
    let image = blog
        .repos
        .images
        .save(PostImage::uploaded(post, "Cane", "cane.jpg"))
        .await
        .unwrap();
    assert_eq!(image.image, "blog/Cane Selection/cane.jpg");

    blog.repos.posts.delete(post.id).await.unwrap();

    assert!(blog.repos.comments.find_by_id(comment.id).await.unwrap().is_none());
    assert!(blog.repos.images.find_by_id(image.id).await.unwrap().is_none());
    assert!(blog.repos.images.for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_requires_existing_post() {
    let blog = seed().await;
    let orphan = Comment::new(
        uuid::Uuid::new_v4(),
        "Ana".to_string(),
        "ana@example.com".to_string(),
        "Hello".to_string(),
    );

    let result = blog.repos.comments.save(orphan).await;
    assert!(matches!(result, Err(RepoError::Constraint(_))));
}

#[tokio::test]
async fn test_slug_unique_per_day_and_language() {
    let blog = seed().await;
    let original = blog.post("Intro to Reeds");
    let clash = Post::new(
        original.author_id,
        PostTranslation::new("en", "Intro to Reeds", "Again"),
    )
    .publish_at(original.publish);

    let result = blog.repos.posts.save(clash).await;
    assert!(matches!(result, Err(RepoError::Constraint(_))));

    let next_day = Post::new(
        original.author_id,
        PostTranslation::new("en", "Intro to Reeds", "Again"),
    )
    .publish_at(at(2023, 1, 11));
    assert!(blog.repos.posts.save(next_day).await.is_ok());
}

#[tokio::test]
async fn test_newsletter_signup_is_idempotent() {
    let blog = seed().await;
    let service = blog.service();
    let form = NewsletterForm {
        email: "Reader@Example.com ".to_string(),
    };

    let first = service.subscribe(form.clone()).await.unwrap();
    let second = service.subscribe(form).await.unwrap();

    let first = first.value.unwrap();
    assert_eq!(first.email, "reader@example.com");
    assert_eq!(first.id, second.value.unwrap().id);

    let invalid = service
        .subscribe(NewsletterForm {
            email: "nope".to_string(),
        })
        .await
        .unwrap();
    assert!(invalid.errors.contains_key("email"));
}

#[tokio::test]
async fn test_index_listing_and_headline() {
    let blog = seed().await;
    let service = blog.service();

    let index = service.index(None, None, &english()).await.unwrap();
    assert_eq!(index.page.window.count, 6);
    assert_eq!(index.page.items[0].title, "Intro to Reeds");
    assert_eq!(
        titles(&index.headline),
        vec!["Intro to Reeds", "Reed Care Basics", "Touring Schedule"]
    );

    let newest = service.index(Some("newest"), None, &english()).await.unwrap();
    assert_eq!(newest.page.items[0].title, "Bassoon Reeds");
}

#[tokio::test]
async fn test_sidebar_widgets() {
    let blog = seed().await;
    let service = blog.service();
    service
        .post_detail(2023, 3, 1, "cane-selection", &english())
        .await
        .unwrap();

    let sidebar = service.sidebar(&english()).await.unwrap();

    assert_eq!(sidebar.total_posts, 6);
    assert_eq!(sidebar.latest.len(), 5);
    assert_eq!(sidebar.latest[0].title, "Bassoon Reeds");
    assert_eq!(sidebar.popular[0].title, "Cane Selection");
    assert_eq!(
        sidebar
            .archive
            .iter()
            .map(|m| (m.year, m.month))
            .collect::<Vec<_>>(),
        vec![(2023, 4), (2023, 3), (2023, 2), (2023, 1)]
    );
    assert_eq!(sidebar.categories.len(), 1);
    assert_eq!(sidebar.categories[0].color, "1a2b3c");
    assert!(sidebar.latest.iter().all(|p| p.tags.len() <= 2));
}

#[tokio::test]
async fn test_feed_lists_latest_with_excerpt() {
    let blog = seed().await;
    let feed = blog.service().feed(&english()).await.unwrap();

    assert_eq!(feed.len(), 5);
    assert_eq!(feed[0].title, "Bassoon Reeds");
    assert_eq!(feed[0].path, "/2023/4/15/bassoon-reeds/");
    assert!(feed[0].summary.ends_with('…'));
    assert_eq!(feed[0].summary.split_whitespace().count(), 31);
    assert!(feed[0].content_html.contains("Scraping a reed"));
}
