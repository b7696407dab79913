use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use validator::Validate;

use crate::{
    entities::user,
    error::{BlogError, Result},
    forms::ProfileForm,
    pagination::{self, Page},
    policy,
    queries::{self, PostRecord},
    service::{accounts, posts},
};

/// The profile and its posts. The owner sees drafts and scheduled posts,
/// everyone else only public ones.
pub async fn profile<C>(
    db: &C,
    viewer: Option<i32>,
    username: &str,
    page: Option<&str>,
) -> Result<(user::Model, Page<PostRecord>)>
where
    C: ConnectionTrait,
{
    let owner = accounts::find_by_username(db, username)
        .await?
        .ok_or(BlogError::NotFound("user"))?;
    let is_owner = viewer == Some(owner.id);
    let select = queries::author_posts(owner.id, is_owner, Utc::now());
    let posts = pagination::fetch_page(db, select, page).await?;
    let posts = posts::load_page(db, posts).await?;
    Ok((owner, posts))
}

pub async fn load_own<C>(db: &C, viewer: i32, username: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let owner = accounts::find_by_username(db, username)
        .await?
        .ok_or(BlogError::NotFound("user"))?;
    policy::ensure_author(viewer, &owner)?;
    Ok(owner)
}

pub async fn update<C>(db: &C, viewer: i32, username: &str, form: &ProfileForm) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let owner = load_own(db, viewer, username).await?;
    form.validate()?;
    if form.username != owner.username && accounts::username_taken(db, &form.username).await? {
        return Err(BlogError::invalid("username", "a user with that username already exists"));
    }
    let mut am: user::ActiveModel = owner.into();
    am.username = Set(form.username.clone());
    am.first_name = Set(form.first_name.clone());
    am.last_name = Set(form.last_name.clone());
    am.email = Set(form.email.clone());
    let updated = am.update(db).await?;
    tracing::info!(user_id = updated.id, "profile updated");
    Ok(updated)
}
