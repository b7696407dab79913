//! Who may see a post and who may change a resource.

use sea_orm::prelude::DateTimeUtc;

use crate::{
    entities::{category, comment, post, user},
    error::{BlogError, Result},
};

/// A post is public when it is published, filed under a published category
/// and its publication date has passed. Posts without a category (the
/// category was deleted) are never public.
pub fn is_publicly_visible(
    post: &post::Model,
    category: Option<&category::Model>,
    now: DateTimeUtc,
) -> bool {
    post.is_published
        && post.pub_date <= now
        && category.is_some_and(|category| {
            category.is_published && post.category_id == Some(category.id)
        })
}

/// Authors always see their own posts; everyone else goes through
/// [`is_publicly_visible`].
pub fn can_view(
    viewer: Option<i32>,
    post: &post::Model,
    category: Option<&category::Model>,
    now: DateTimeUtc,
) -> bool {
    viewer == Some(post.author_id) || is_publicly_visible(post, category, now)
}

/// Resources only their author may change.
pub trait Authored {
    const KIND: &'static str;

    fn author_id(&self) -> i32;
}

impl Authored for post::Model {
    const KIND: &'static str = "post";

    fn author_id(&self) -> i32 {
        self.author_id
    }
}

impl Authored for comment::Model {
    const KIND: &'static str = "comment";

    fn author_id(&self) -> i32 {
        self.author_id
    }
}

impl Authored for user::Model {
    const KIND: &'static str = "profile";

    fn author_id(&self) -> i32 {
        self.id
    }
}

pub fn ensure_author<R: Authored>(viewer: i32, resource: &R) -> Result<()> {
    if resource.author_id() == viewer {
        Ok(())
    } else {
        tracing::warn!(viewer, kind = R::KIND, "ownership check failed");
        Err(BlogError::Forbidden(R::KIND))
    }
}

pub fn ensure_staff(user: &user::Model) -> Result<()> {
    if user.is_staff {
        Ok(())
    } else {
        tracing::warn!(user = %user.username, "non-staff user on moderation endpoint");
        Err(BlogError::Forbidden("resource"))
    }
}
