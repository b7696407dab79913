//! Response documents.

use chrono::{DateTime, Utc};
use poem_openapi::Object;

use crate::{
    entities::{category, location, user},
    pagination::Page,
    queries::PostRecord,
    service::comments::CommentRecord,
};

#[derive(Debug, Object)]
pub struct CategoryView {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub description: String,
}

impl From<category::Model> for CategoryView {
    fn from(c: category::Model) -> Self {
        Self {
            id: c.id,
            slug: c.slug,
            title: c.title,
            description: c.description,
        }
    }
}

#[derive(Debug, Object)]
pub struct LocationView {
    pub id: i32,
    pub name: String,
}

impl From<location::Model> for LocationView {
    fn from(l: location::Model) -> Self {
        Self { id: l.id, name: l.name }
    }
}

#[derive(Debug, Object)]
pub struct PostView {
    pub id: i32,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub category: Option<CategoryView>,
    /// Only shown while the location is published.
    pub location: Option<LocationView>,
    pub comment_count: i64,
}

impl From<PostRecord> for PostView {
    fn from(record: PostRecord) -> Self {
        let PostRecord {
            post,
            author,
            category,
            location,
            comment_count,
        } = record;
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            pub_date: post.pub_date,
            image: post.image,
            is_published: post.is_published,
            created_at: post.created_at,
            author,
            category: category.map(CategoryView::from),
            location: location.filter(|l| l.is_published).map(LocationView::from),
            comment_count,
        }
    }
}

#[derive(Debug, Object)]
pub struct PostPage {
    pub items: Vec<PostView>,
    pub page: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl From<Page<PostRecord>> for PostPage {
    fn from(page: Page<PostRecord>) -> Self {
        let has_previous = page.has_previous();
        let has_next = page.has_next();
        let page = page.map(PostView::from);
        Self {
            items: page.items,
            page: page.number,
            num_pages: page.num_pages,
            count: page.count,
            has_previous,
            has_next,
        }
    }
}

#[derive(Debug, Object)]
pub struct CommentView {
    pub id: i32,
    pub post_id: i32,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRecord> for CommentView {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: record.comment.id,
            post_id: record.comment.post_id,
            text: record.comment.text,
            author: record.author,
            created_at: record.comment.created_at,
        }
    }
}

#[derive(Debug, Object)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Object)]
pub struct CategoryPage {
    pub category: CategoryView,
    pub posts: PostPage,
}

/// What a post form may reference.
#[derive(Debug, Object)]
pub struct PostChoices {
    pub categories: Vec<CategoryView>,
    pub locations: Vec<LocationView>,
}

impl PostChoices {
    pub fn new(categories: Vec<category::Model>, locations: Vec<location::Model>) -> Self {
        Self {
            categories: categories.into_iter().map(CategoryView::from).collect(),
            locations: locations.into_iter().map(LocationView::from).collect(),
        }
    }
}

#[derive(Debug, Object)]
pub struct PostEditPage {
    pub post: PostView,
    pub choices: PostChoices,
}

#[derive(Debug, Object)]
pub struct ProfileView {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

impl From<user::Model> for ProfileView {
    fn from(u: user::Model) -> Self {
        Self {
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            date_joined: u.created_at,
        }
    }
}

#[derive(Debug, Object)]
pub struct ProfilePage {
    pub profile: ProfileView,
    pub posts: PostPage,
}

/// Current values of the profile form, email included.
#[derive(Debug, Object)]
pub struct AccountView {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<user::Model> for AccountView {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
        }
    }
}

#[derive(Debug, Object)]
pub struct TokenView {
    pub access_token: String,
    pub token_type: String,
    pub username: String,
}

#[derive(Debug, Object)]
pub struct CategoryAdminView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub post_count: i64,
}

impl CategoryAdminView {
    pub fn new(c: category::Model, post_count: i64) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            slug: c.slug,
            is_published: c.is_published,
            created_at: c.created_at,
            post_count,
        }
    }
}

#[derive(Debug, Object)]
pub struct LocationAdminView {
    pub id: i32,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub post_count: i64,
}

impl LocationAdminView {
    pub fn new(l: location::Model, post_count: i64) -> Self {
        Self {
            id: l.id,
            name: l.name,
            is_published: l.is_published,
            created_at: l.created_at,
            post_count,
        }
    }
}
