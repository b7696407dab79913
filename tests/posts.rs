mod common;

use blogicum::entities::{comment, post};
use poem::http::StatusCode;
use rstest::rstest;
use sea_orm::EntityTrait;
use serde_json::json;

use common::{NewPost, TestApp, app, json};

#[rstest]
#[tokio::test]
async fn create_requires_a_token(#[future] app: TestApp) {
    let app = app.await;
    let open = app.category("open", true).await;
    let body = json!({ "title": "t", "text": "x", "category_id": open.id });
    app.post_json("/posts/create", None, &body)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.post_json("/posts/create", Some("garbage"), &body)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn created_post_is_public_and_owned_by_viewer(#[future] app: TestApp) {
    let app = app.await;
    let (_, token) = app.user("writer").await;
    let open = app.category("open", true).await;
    let place = app.location("Kazan", true).await;

    let resp = app
        .post_json(
            "/posts/create",
            Some(&token),
            &json!({
                "title": "First",
                "text": "Hello",
                "category_id": open.id,
                "location_id": place.id,
            }),
        )
        .await;
    resp.assert_status_is_ok();
    let created = json(resp).await;
    assert_eq!(created["author"], "writer");
    assert_eq!(created["location"]["name"], "Kazan");
    assert_eq!(created["comment_count"], 0);

    let feed = json(app.get("/", None).await).await;
    assert_eq!(feed["items"][0]["id"], created["id"]);
}

#[rstest]
#[tokio::test]
async fn future_publication_date_schedules_the_post(#[future] app: TestApp) {
    let app = app.await;
    let (_, token) = app.user("writer").await;
    let open = app.category("open", true).await;
    let when = chrono::Utc::now() + chrono::Duration::days(7);

    let resp = app
        .post_json(
            "/posts/create",
            Some(&token),
            &json!({
                "title": "Later",
                "text": "Soon",
                "category_id": open.id,
                "pub_date": when.to_rfc3339(),
            }),
        )
        .await;
    resp.assert_status_is_ok();
    let created = json(resp).await;

    let feed = json(app.get("/", None).await).await;
    assert_eq!(feed["count"], 0);
    let path = format!("/posts/{}", created["id"]);
    app.get(&path, None).await.assert_status(StatusCode::NOT_FOUND);
    app.get(&path, Some(&token)).await.assert_status_is_ok();
}

#[rstest]
#[case::empty_title(json!({ "title": "", "text": "x" }), "title")]
#[case::empty_text(json!({ "title": "t", "text": "" }), "text")]
#[tokio::test]
async fn invalid_post_form_is_rejected(
    #[future] app: TestApp,
    #[case] body: serde_json::Value,
    #[case] field: &str,
) {
    let app = app.await;
    let mut body = body;
    let (_, token) = app.user("writer").await;
    let open = app.category("open", true).await;
    body["category_id"] = json!(open.id);

    let resp = app.post_json("/posts/create", Some(&token), &body).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let err = json(resp).await;
    assert!(err["fields"].get(field).is_some(), "no error for {field}: {err}");
    assert!(post::Entity::find().all(&app.state.db).await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn unknown_category_is_a_validation_error(#[future] app: TestApp) {
    let app = app.await;
    let (_, token) = app.user("writer").await;
    let resp = app
        .post_json(
            "/posts/create",
            Some(&token),
            &json!({ "title": "t", "text": "x", "category_id": 999 }),
        )
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let err = json(resp).await;
    assert!(err["fields"].get("category_id").is_some());
}

#[rstest]
#[tokio::test]
async fn create_form_offers_every_category_and_location(#[future] app: TestApp) {
    let app = app.await;
    let (_, token) = app.user("writer").await;
    app.category("open", true).await;
    app.category("closed", false).await;
    app.location("Omsk", false).await;

    let resp = app.get("/posts/create", Some(&token)).await;
    resp.assert_status_is_ok();
    let choices = json(resp).await;
    assert_eq!(choices["categories"].as_array().unwrap().len(), 2);
    assert_eq!(choices["locations"].as_array().unwrap().len(), 1);
}

#[rstest]
#[tokio::test]
async fn author_edits_own_post(#[future] app: TestApp) {
    let app = app.await;
    let (author, token) = app.user("author").await;
    let open = app.category("open", true).await;
    let other = app.category("other", true).await;
    let post = app.post(&author, NewPost::public("before", &open)).await;

    let resp = app.get(&format!("/posts/{}/edit", post.id), Some(&token)).await;
    resp.assert_status_is_ok();
    let page = json(resp).await;
    assert_eq!(page["post"]["title"], "before");

    let resp = app
        .post_json(
            &format!("/posts/{}/edit", post.id),
            Some(&token),
            &json!({ "title": "after", "text": "new", "category_id": other.id }),
        )
        .await;
    resp.assert_status_is_ok();
    let updated = json(resp).await;
    assert_eq!(updated["title"], "after");
    assert_eq!(updated["category"]["slug"], "other");

    let stored = post::Entity::find_by_id(post.id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.pub_date, post.pub_date);
}

#[rstest]
#[case::edit_form("GET", "edit")]
#[case::edit("POST", "edit")]
#[case::delete_form("GET", "delete")]
#[case::delete("POST", "delete")]
#[tokio::test]
async fn non_author_is_forbidden(
    #[future] app: TestApp,
    #[case] method: &str,
    #[case] action: &str,
) {
    let app = app.await;
    let (author, _) = app.user("author").await;
    let (_, intruder) = app.user("intruder").await;
    let open = app.category("open", true).await;
    let post = app.post(&author, NewPost::public("mine", &open)).await;

    let path = format!("/posts/{}/{action}", post.id);
    let body = json!({ "title": "stolen", "text": "x", "category_id": open.id });
    let resp = match method {
        "GET" => app.get(&path, Some(&intruder)).await,
        _ => app.post_json(&path, Some(&intruder), &body).await,
    };
    resp.assert_status(StatusCode::FORBIDDEN);

    let stored = post::Entity::find_by_id(post.id)
        .one(&app.state.db)
        .await
        .unwrap()
        .expect("post survived");
    assert_eq!(stored.title, "mine");
}

#[rstest]
#[tokio::test]
async fn editing_missing_post_is_not_found(#[future] app: TestApp) {
    let app = app.await;
    let (_, token) = app.user("author").await;
    app.get("/posts/77/edit", Some(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn deleting_a_post_removes_its_comments(#[future] app: TestApp) {
    let app = app.await;
    let (author, token) = app.user("author").await;
    let (reader, _) = app.user("reader").await;
    let open = app.category("open", true).await;
    let post = app.post(&author, NewPost::public("doomed", &open)).await;
    app.comment(&post, &reader, "first!").await;
    app.comment(&post, &author, "thanks").await;

    let resp = app.get(&format!("/posts/{}/delete", post.id), Some(&token)).await;
    resp.assert_status_is_ok();
    assert_eq!(json(resp).await["comment_count"], 2);

    app.post_json(&format!("/posts/{}/delete", post.id), Some(&token), &json!({}))
        .await
        .assert_status_is_ok();

    let db = &app.state.db;
    assert!(post::Entity::find_by_id(post.id).one(db).await.unwrap().is_none());
    assert!(comment::Entity::find().all(db).await.unwrap().is_empty());
    app.get(&format!("/posts/{}", post.id), Some(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn listing_carries_comment_counts(#[future] app: TestApp) {
    let app = app.await;
    let (author, _) = app.user("author").await;
    let open = app.category("open", true).await;
    let quiet = app
        .post(&author, NewPost { days_ago: 2, ..NewPost::public("quiet", &open) })
        .await;
    let busy = app.post(&author, NewPost::public("busy", &open)).await;
    for text in ["a", "b", "c"] {
        app.comment(&busy, &author, text).await;
    }

    let feed = json(app.get("/", None).await).await;
    assert_eq!(feed["items"][0]["id"], busy.id);
    assert_eq!(feed["items"][0]["comment_count"], 3);
    assert_eq!(feed["items"][1]["id"], quiet.id);
    assert_eq!(feed["items"][1]["comment_count"], 0);
}
