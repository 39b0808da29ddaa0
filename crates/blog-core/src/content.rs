//! Content helpers: slugs, markdown rendering, excerpts and upload paths.

use pulldown_cmark::{Options, Parser, html};

/// Derive a URL-safe slug from a title or name.
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// Render a markdown post body to HTML.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, parser);
    out
}

/// Keep the first `count` words of `text`, appending an ellipsis when cut.
pub fn truncate_words(text: &str, count: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= count {
        return words.join(" ");
    }
    format!("{} …", words[..count].join(" "))
}

/// Storage path for an image uploaded to a post: `blog/<post title>/<filename>`.
pub fn image_upload_path(post_title: &str, filename: &str) -> String {
    format!("blog/{post_title}/{filename}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Reed Care Basics"), "reed-care-basics");
        assert_eq!(slugify("  Cañas & Tudel "), "canas-tudel");
    }

    #[test]
    fn test_render_markdown() {
        let html = render_markdown("# Reeds\n\nSoak *before* playing.");
        assert!(html.contains("<h1>Reeds</h1>"));
        assert!(html.contains("<em>before</em>"));
    }

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words("one two three", 5), "one two three");
        assert_eq!(truncate_words("one two three", 2), "one two …");
    }

    #[test]
    fn test_image_upload_path() {
        assert_eq!(
            image_upload_path("Intro to Reeds", "cane.jpg"),
            "blog/Intro to Reeds/cane.jpg"
        );
    }
}
