mod common;

use blogicum::entities::user;
use poem::http::StatusCode;
use rstest::rstest;
use sea_orm::EntityTrait;
use serde_json::json;

use common::{NewPost, TestApp, app, item_ids, json};

#[rstest]
#[tokio::test]
async fn owner_sees_every_own_post_others_only_public(#[future] app: TestApp) {
    let app = app.await;
    let (owner, owner_token) = app.user("owner").await;
    let (_, other_token) = app.user("other").await;
    let open = app.category("open", true).await;
    let closed = app.category("closed", false).await;

    let public = app
        .post(&owner, NewPost { days_ago: 3, ..NewPost::public("public", &open) })
        .await;
    let draft = app
        .post(
            &owner,
            NewPost { is_published: false, days_ago: 2, ..NewPost::public("draft", &open) },
        )
        .await;
    let scheduled = app
        .post(&owner, NewPost { days_ago: -2, ..NewPost::public("scheduled", &open) })
        .await;
    let hidden_category = app
        .post(&owner, NewPost { days_ago: 1, ..NewPost::public("hidden", &closed) })
        .await;

    let own = json(app.get("/profile/owner", Some(&owner_token)).await).await;
    assert_eq!(own["profile"]["username"], "owner");
    assert_eq!(
        item_ids(&own["posts"]),
        vec![
            i64::from(scheduled.id),
            i64::from(hidden_category.id),
            i64::from(draft.id),
            i64::from(public.id),
        ]
    );

    for token in [Some(other_token.as_str()), None] {
        let seen = json(app.get("/profile/owner", token).await).await;
        assert_eq!(item_ids(&seen["posts"]), vec![i64::from(public.id)]);
    }
}

#[rstest]
#[tokio::test]
async fn unknown_profile_is_not_found(#[future] app: TestApp) {
    let app = app.await;
    app.get("/profile/nobody", None)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn public_profile_hides_email(#[future] app: TestApp) {
    let app = app.await;
    app.user("quiet").await;
    let page = json(app.get("/profile/quiet", None).await).await;
    assert!(page["profile"].get("email").is_none());
}

#[rstest]
#[tokio::test]
async fn owner_edits_profile(#[future] app: TestApp) {
    let app = app.await;
    let (owner, token) = app.user("leo").await;

    let form = json(app.get("/profile/leo/edit", Some(&token)).await).await;
    assert_eq!(form["email"], "leo@example.com");

    let resp = app
        .post_json(
            "/profile/leo/edit",
            Some(&token),
            &json!({
                "username": "lev",
                "first_name": "Lev",
                "last_name": "Tolstoy",
                "email": "lev@example.com",
            }),
        )
        .await;
    resp.assert_status_is_ok();
    assert_eq!(json(resp).await["username"], "lev");

    let stored = user::Entity::find_by_id(owner.id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.username, "lev");
    assert_eq!(stored.last_name, "Tolstoy");
    app.get("/profile/lev", None).await.assert_status_is_ok();
}

#[rstest]
#[tokio::test]
async fn email_may_be_cleared(#[future] app: TestApp) {
    let app = app.await;
    let (owner, token) = app.user("leo").await;

    let resp = app
        .post_json(
            "/profile/leo/edit",
            Some(&token),
            &json!({ "username": "leo", "first_name": "", "last_name": "", "email": "" }),
        )
        .await;
    resp.assert_status_is_ok();

    let stored = user::Entity::find_by_id(owner.id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.email, "");
}

#[rstest]
#[tokio::test]
async fn editing_someone_elses_profile_is_forbidden(#[future] app: TestApp) {
    let app = app.await;
    app.user("victim").await;
    let (_, token) = app.user("intruder").await;

    app.get("/profile/victim/edit", Some(&token))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.post_json(
        "/profile/victim/edit",
        Some(&token),
        &json!({
            "username": "victim",
            "first_name": "",
            "last_name": "",
            "email": "owned@example.com",
        }),
    )
    .await
    .assert_status(StatusCode::FORBIDDEN);
}

#[rstest]
#[case::taken_username(json!({ "username": "taken", "first_name": "", "last_name": "", "email": "a@b.co" }), "username")]
#[case::bad_email(json!({ "username": "me", "first_name": "", "last_name": "", "email": "nope" }), "email")]
#[case::bad_characters(json!({ "username": "two words", "first_name": "", "last_name": "", "email": "a@b.co" }), "username")]
#[tokio::test]
async fn invalid_profile_edit_is_rejected(
    #[future] app: TestApp,
    #[case] body: serde_json::Value,
    #[case] field: &str,
) {
    let app = app.await;
    app.user("taken").await;
    let (_, token) = app.user("me").await;

    let resp = app.post_json("/profile/me/edit", Some(&token), &body).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert!(json(resp).await["fields"].get(field).is_some());
}
