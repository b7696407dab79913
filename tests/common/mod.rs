//! Shared harness: the full app over a fresh in-memory SQLite database.

#![allow(dead_code)]

use blogicum::{
    AppState,
    auth::TokenKeys,
    build_app,
    entities::{category, comment, location, post, user},
    migration::Migrator,
};
use chrono::{Duration, Utc};
use poem::{
    EndpointExt, Response,
    endpoint::BoxEndpoint,
    http::header,
    test::{TestClient, TestResponse},
};
use rstest::fixture;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;

pub struct TestApp {
    pub cli: TestClient<BoxEndpoint<'static, Response>>,
    pub state: AppState,
}

#[fixture]
pub async fn app() -> TestApp {
    TestApp::new().await
}

/// Seeded post attributes; `days_ago` may be negative for scheduled posts.
#[derive(Clone, Copy)]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub is_published: bool,
    pub days_ago: i64,
    pub category: Option<i32>,
    pub location: Option<i32>,
}

impl<'a> NewPost<'a> {
    pub fn public(title: &'a str, category: &category::Model) -> Self {
        Self {
            title,
            is_published: true,
            days_ago: 1,
            category: Some(category.id),
            location: None,
        }
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .expect("failed to open in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("failed to apply migrations");
        let state = AppState::new(db, TokenKeys::new(b"test-secret", Duration::hours(1)));
        Self {
            cli: TestClient::new(build_app(state.clone()).boxed()),
            state,
        }
    }

    /// Inserts a user directly and returns it with a valid bearer token.
    /// The password hash is a placeholder that never verifies.
    pub async fn user(&self, username: &str) -> (user::Model, String) {
        self.insert_user(username, false).await
    }

    pub async fn staff(&self, username: &str) -> (user::Model, String) {
        self.insert_user(username, true).await
    }

    async fn insert_user(&self, username: &str, is_staff: bool) -> (user::Model, String) {
        let user = user::ActiveModel {
            username: Set(username.to_owned()),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            email: Set(format!("{username}@example.com")),
            password_hash: Set("!".to_owned()),
            is_staff: Set(is_staff),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("failed to insert user");
        let token = self.state.tokens.issue(&user).expect("failed to issue token");
        (user, token)
    }

    pub async fn category(&self, slug: &str, is_published: bool) -> category::Model {
        category::ActiveModel {
            title: Set(slug.to_uppercase()),
            description: Set(format!("All about {slug}")),
            slug: Set(slug.to_owned()),
            is_published: Set(is_published),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("failed to insert category")
    }

    pub async fn location(&self, name: &str, is_published: bool) -> location::Model {
        location::ActiveModel {
            name: Set(name.to_owned()),
            is_published: Set(is_published),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("failed to insert location")
    }

    pub async fn post(&self, author: &user::Model, seed: NewPost<'_>) -> post::Model {
        let now = Utc::now();
        post::ActiveModel {
            title: Set(seed.title.to_owned()),
            text: Set(format!("Text of {}", seed.title)),
            pub_date: Set(now - Duration::days(seed.days_ago)),
            image: Set(None),
            is_published: Set(seed.is_published),
            created_at: Set(now),
            author_id: Set(author.id),
            location_id: Set(seed.location),
            category_id: Set(seed.category),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("failed to insert post")
    }

    pub async fn comment(&self, post: &post::Model, author: &user::Model, text: &str) -> comment::Model {
        comment::ActiveModel {
            text: Set(text.to_owned()),
            created_at: Set(Utc::now()),
            post_id: Set(post.id),
            author_id: Set(author.id),
            ..Default::default()
        }
        .insert(&self.state.db)
        .await
        .expect("failed to insert comment")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut req = self.cli.get(path);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.send().await
    }

    pub async fn post_json(&self, path: &str, token: Option<&str>, body: &Value) -> TestResponse {
        let mut req = self.cli.post(path).body_json(body);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.send().await
    }

    pub async fn put_json(&self, path: &str, token: Option<&str>, body: &Value) -> TestResponse {
        let mut req = self.cli.put(path).body_json(body);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.send().await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut req = self.cli.delete(path);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.send().await
    }
}

pub async fn json(resp: TestResponse) -> Value {
    resp.0
        .into_body()
        .into_json::<Value>()
        .await
        .expect("response body is not JSON")
}

/// Ids of the posts in a page document, in order.
pub fn item_ids(page: &Value) -> Vec<i64> {
    page["items"]
        .as_array()
        .expect("page has no items")
        .iter()
        .map(|item| item["id"].as_i64().expect("item without id"))
        .collect()
}
