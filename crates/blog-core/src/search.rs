//! Filter requests for the post search page.
//!
//! A request selects exactly one filter branch. The branch decides which
//! published posts match and how they are ordered by default; `order_by`
//! may override that ordering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the visitor searched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchRequest {
    /// Fuzzy match against post titles.
    Text { query: String },
    /// Posts published in the given month.
    Date { year: i32, month: u32 },
    /// Posts carrying the tag with this slug.
    Tag { slug: String },
    /// Posts in the category with this name.
    Category { name: String },
    /// Nothing to search for.
    None,
}

impl SearchRequest {
    /// Select a branch from loose parameters.
    ///
    /// Priority is fixed: text, then date, then tag, then category.
    pub fn from_params(
        query: Option<String>,
        date: Option<(i32, u32)>,
        tag_slug: Option<String>,
        category: Option<String>,
    ) -> Self {
        if let Some(query) = query {
            SearchRequest::Text { query }
        } else if let Some((year, month)) = date {
            SearchRequest::Date { year, month }
        } else if let Some(slug) = tag_slug {
            SearchRequest::Tag { slug }
        } else if let Some(name) = category {
            SearchRequest::Category { name }
        } else {
            SearchRequest::None
        }
    }

    /// Text shown in the search box for this request.
    pub fn placeholder(&self) -> String {
        match self {
            SearchRequest::Text { query } => query.clone(),
            SearchRequest::Category { name } => format!("@{name}"),
            SearchRequest::Tag { slug } => format!("#{slug}"),
            SearchRequest::Date { .. } | SearchRequest::None => String::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchRequest::Text { .. } => "text",
            SearchRequest::Date { .. } => "date",
            SearchRequest::Tag { .. } => "tag",
            SearchRequest::Category { .. } => "category",
            SearchRequest::None => "none",
        }
    }
}

/// Values accepted by the `order_by` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Relevance,
    Newest,
    Oldest,
}

impl OrderBy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "relevance" => Some(OrderBy::Relevance),
            "newest" => Some(OrderBy::Newest),
            "oldest" => Some(OrderBy::Oldest),
            _ => None,
        }
    }
}

/// Sort order applied by the post repository. Ties always break on post id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrdering {
    /// Similarity descending, then newest.
    Relevance,
    NewestFirst,
    OldestFirst,
    /// Creation time ascending.
    EarliestCreated,
    MostVisited,
    MostCommented,
}

/// Ordering for a search request given the raw `order_by` parameter.
///
/// Text searches default to relevance. Every other branch, and any explicit
/// value other than `oldest`, sorts newest first.
pub fn resolve_ordering(request: &SearchRequest, order_by: Option<&str>) -> PostOrdering {
    let order_by = order_by.map(OrderBy::parse);
    match (request, order_by) {
        (SearchRequest::Text { .. }, None | Some(Some(OrderBy::Relevance))) => {
            PostOrdering::Relevance
        }
        (_, Some(Some(OrderBy::Oldest))) => PostOrdering::OldestFirst,
        _ => PostOrdering::NewestFirst,
    }
}

/// A resolved filter, ready to hand to the post repository.
#[derive(Debug, Clone, PartialEq)]
pub enum PostFilter {
    /// Every published post.
    All,
    /// Title similarity above the threshold.
    Text(String),
    Date { year: i32, month: u32 },
    Tag(Uuid),
    Category(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text() -> SearchRequest {
        SearchRequest::Text {
            query: "reed".to_string(),
        }
    }

    fn tag() -> SearchRequest {
        SearchRequest::Tag {
            slug: "cane".to_string(),
        }
    }

    #[test]
    fn test_from_params_priority() {
        let request = SearchRequest::from_params(
            Some("reed".to_string()),
            Some((2023, 4)),
            Some("cane".to_string()),
            Some("Reeds".to_string()),
        );
        assert_eq!(request, text());

        let request =
            SearchRequest::from_params(None, Some((2023, 4)), Some("cane".to_string()), None);
        assert_eq!(request, SearchRequest::Date { year: 2023, month: 4 });

        let request = SearchRequest::from_params(
            None,
            None,
            Some("cane".to_string()),
            Some("Reeds".to_string()),
        );
        assert_eq!(request, tag());

        let request = SearchRequest::from_params(None, None, None, Some("Reeds".to_string()));
        assert_eq!(
            request,
            SearchRequest::Category {
                name: "Reeds".to_string()
            }
        );

        assert_eq!(
            SearchRequest::from_params(None, None, None, None),
            SearchRequest::None
        );
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(text().placeholder(), "reed");
        assert_eq!(tag().placeholder(), "#cane");
        assert_eq!(
            SearchRequest::Category {
                name: "Reeds".to_string()
            }
            .placeholder(),
            "@Reeds"
        );
        assert_eq!(
            SearchRequest::Date { year: 2023, month: 4 }.placeholder(),
            ""
        );
        assert_eq!(SearchRequest::None.placeholder(), "");
    }

    #[rstest]
    #[case(text(), None, PostOrdering::Relevance)]
    #[case(text(), Some("relevance"), PostOrdering::Relevance)]
    #[case(text(), Some("newest"), PostOrdering::NewestFirst)]
    #[case(text(), Some("oldest"), PostOrdering::OldestFirst)]
    #[case(text(), Some("bogus"), PostOrdering::NewestFirst)]
    #[case(tag(), None, PostOrdering::NewestFirst)]
    #[case(tag(), Some("relevance"), PostOrdering::NewestFirst)]
    #[case(tag(), Some("oldest"), PostOrdering::OldestFirst)]
    #[case(SearchRequest::Date { year: 2023, month: 4 }, None, PostOrdering::NewestFirst)]
    #[case(SearchRequest::Date { year: 2023, month: 4 }, Some("oldest"), PostOrdering::OldestFirst)]
    fn test_resolve_ordering(
        #[case] request: SearchRequest,
        #[case] order_by: Option<&str>,
        #[case] expected: PostOrdering,
    ) {
        assert_eq!(resolve_ordering(&request, order_by), expected);
    }
}
