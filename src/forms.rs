//! Request payloads. Each form is validated before anything is written.

use chrono::{DateTime, Utc};
use poem_openapi::Object;
use validator::{Validate, ValidateEmail, ValidationError};

/// Latin letters, digits, hyphen and underscore.
fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let ok = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("slug")
            .with_message("use latin letters, digits, hyphens and underscores".into()))
    }
}

/// Letters, digits and `@ . + - _`.
fn validate_username(username: &str) -> Result<(), ValidationError> {
    let ok = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("use letters, digits and @/./+/-/_ only".into()))
    }
}

/// Accounts may leave the email blank.
fn validate_email_or_blank(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("enter a valid email address".into()))
    }
}

#[derive(Debug, Clone, Object, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1))]
    pub text: String,
    /// Defaults to now; a future date schedules the post.
    pub pub_date: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub image: Option<String>,
    pub category_id: i32,
    pub location_id: Option<i32>,
}

#[derive(Debug, Clone, Object, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Clone, Object, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(max = 150))]
    pub first_name: String,
    #[validate(length(max = 150))]
    pub last_name: String,
    #[validate(custom(function = "validate_email_or_blank"))]
    pub email: String,
}

#[derive(Debug, Clone, Object, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(custom(function = "validate_email_or_blank"))]
    pub email: String,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Object)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Object, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    pub description: String,
    #[validate(length(max = 50), custom(function = "validate_slug"))]
    pub slug: String,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Object, Validate)]
pub struct LocationForm {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    pub is_published: Option<bool>,
}

/// Staff-only changes to a post. Absent fields stay as they are.
#[derive(Debug, Clone, Default, Object, Validate)]
pub struct ModerationForm {
    pub is_published: Option<bool>,
    pub pub_date: Option<DateTime<Utc>>,
    pub category_id: Option<i32>,
    pub location_id: Option<i32>,
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub text: Option<String>,
}
