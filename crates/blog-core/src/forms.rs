//! Visitor-submitted forms and their validation.
//!
//! Invalid input never has a side effect; callers get a map of field name to
//! messages and redisplay the form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::ports::OutgoingMail;

/// Field name to error messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Flatten validator output into [`FieldErrors`].
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", e.code))
            })
            .collect();
        out.insert(field.to_string(), messages);
    }
    out
}

fn check<T: Validate>(form: &T) -> Result<(), FieldErrors> {
    form.validate().map_err(|e| field_errors(&e))
}

/// "Share this post" form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ShareForm {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 25,
        message = "Enter your name (at most 25 characters)."
    ))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub to: String,

    #[serde(default)]
    pub comments: String,
}

impl ShareForm {
    /// Trim surrounding whitespace and validate.
    pub fn clean(self) -> Result<Self, FieldErrors> {
        let form = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            to: self.to.trim().to_string(),
            comments: self.comments.trim().to_string(),
        };
        check(&form)?;
        Ok(form)
    }

    /// Compose the recommendation email for a post.
    pub fn compose(&self, from: &str, post_title: &str, post_url: &str) -> OutgoingMail {
        OutgoingMail {
            from: from.to_string(),
            to: vec![self.to.clone()],
            reply_to: Some(self.email.clone()),
            subject: format!("{} recommends you read {}", self.name, post_title),
            body: format!(
                "Read {} at {}\n\n{}'s comments: {}",
                post_title, post_url, self.name, self.comments
            ),
        }
    }
}

/// Comment left on a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 80,
        message = "Enter your name (at most 80 characters)."
    ))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub body: String,
}

impl CommentForm {
    pub fn clean(self) -> Result<Self, FieldErrors> {
        let form = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            body: self.body.trim().to_string(),
        };
        check(&form)?;
        Ok(form)
    }
}

/// Newsletter signup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewsletterForm {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

impl NewsletterForm {
    /// Trim and lowercase the address, then validate.
    pub fn clean(self) -> Result<Self, FieldErrors> {
        let form = Self {
            email: self.email.trim().to_lowercase(),
        };
        check(&form)?;
        Ok(form)
    }
}

/// Result of processing a submitted form.
#[derive(Debug, Clone, Serialize)]
pub struct FormOutcome<T> {
    pub value: Option<T>,
    pub errors: FieldErrors,
}

impl<T> FormOutcome<T> {
    pub fn accepted(value: T) -> Self {
        Self {
            value: Some(value),
            errors: FieldErrors::new(),
        }
    }

    pub fn rejected(errors: FieldErrors) -> Self {
        Self {
            value: None,
            errors,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share() -> ShareForm {
        ShareForm {
            name: " Vera ".to_string(),
            email: "vera@example.com".to_string(),
            to: "friend@example.com".to_string(),
            comments: "Worth a read".to_string(),
        }
    }

    #[test]
    fn test_valid_share_form_is_trimmed() {
        let form = share().clean().unwrap();
        assert_eq!(form.name, "Vera");
    }

    #[test]
    fn test_share_form_reports_each_bad_field() {
        let form = ShareForm {
            name: String::new(),
            email: "nope".to_string(),
            to: String::new(),
            comments: String::new(),
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("to"));
        assert!(!errors.contains_key("comments"));
    }

    #[test]
    fn test_share_name_length_limit() {
        let form = ShareForm {
            name: "x".repeat(26),
            ..share()
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(
            errors["name"],
            vec!["Enter your name (at most 25 characters).".to_string()]
        );
    }

    #[test]
    fn test_compose_share_mail() {
        let form = share().clean().unwrap();
        let mail = form.compose(
            "blog@example.com",
            "Intro to Reeds",
            "https://example.com/2023/4/9/intro-to-reeds/",
        );
        assert_eq!(mail.subject, "Vera recommends you read Intro to Reeds");
        assert_eq!(
            mail.body,
            "Read Intro to Reeds at https://example.com/2023/4/9/intro-to-reeds/\n\nVera's comments: Worth a read"
        );
        assert_eq!(mail.to, vec!["friend@example.com".to_string()]);
    }

    #[test]
    fn test_comment_form_requires_body() {
        let form = CommentForm {
            name: "Vera".to_string(),
            email: "vera@example.com".to_string(),
            body: "   ".to_string(),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("body"));
    }

    #[test]
    fn test_newsletter_email_is_normalised() {
        let form = NewsletterForm {
            email: " Vera@Example.COM ".to_string(),
        }
        .clean()
        .unwrap();
        assert_eq!(form.email, "vera@example.com");
    }
}
