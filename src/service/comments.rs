use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use validator::Validate;

use crate::{
    entities::{comment, post, user},
    error::{BlogError, Result},
    forms::CommentForm,
    policy,
    service::posts,
};

#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub comment: comment::Model,
    pub author: String,
}

/// Comments of a post, oldest first.
pub(crate) async fn for_post<C>(db: &C, post: &post::Model) -> Result<Vec<CommentRecord>>
where
    C: ConnectionTrait,
{
    let rows = post
        .find_related(comment::Entity)
        .find_also_related(user::Entity)
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(comment, author)| CommentRecord {
            comment,
            author: author.map(|a| a.username).unwrap_or_default(),
        })
        .collect())
}

async fn with_author<C>(db: &C, comment: comment::Model) -> Result<CommentRecord>
where
    C: ConnectionTrait,
{
    let author = user::Entity::find_by_id(comment.author_id)
        .one(db)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();
    Ok(CommentRecord { comment, author })
}

pub async fn list<C>(db: &C, viewer: Option<i32>, post_id: i32) -> Result<Vec<CommentRecord>>
where
    C: ConnectionTrait,
{
    let post = posts::visible_post(db, viewer, post_id).await?;
    for_post(db, &post).await
}

/// Comments can only be left on posts the viewer can see.
pub async fn create<C>(db: &C, viewer: i32, post_id: i32, form: &CommentForm) -> Result<CommentRecord>
where
    C: ConnectionTrait,
{
    let post = posts::visible_post(db, Some(viewer), post_id).await?;
    form.validate()?;
    let created = comment::ActiveModel {
        text: Set(form.text.clone()),
        created_at: Set(Utc::now()),
        post_id: Set(post.id),
        author_id: Set(viewer),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(comment_id = created.id, post_id, "comment added");
    with_author(db, created).await
}

/// 404 when the comment does not exist under this post, 403 when it is not
/// the viewer's.
pub async fn load_owned<C>(db: &C, viewer: i32, post_id: i32, comment_id: i32) -> Result<comment::Model>
where
    C: ConnectionTrait,
{
    let comment = comment::Entity::find_by_id(comment_id)
        .filter(comment::Column::PostId.eq(post_id))
        .one(db)
        .await?
        .ok_or(BlogError::NotFound("comment"))?;
    policy::ensure_author(viewer, &comment)?;
    Ok(comment)
}

/// [`load_owned`] with the author's username, for the edit and delete forms.
pub async fn owned_record<C>(db: &C, viewer: i32, post_id: i32, comment_id: i32) -> Result<CommentRecord>
where
    C: ConnectionTrait,
{
    let comment = load_owned(db, viewer, post_id, comment_id).await?;
    with_author(db, comment).await
}

pub async fn update<C>(
    db: &C,
    viewer: i32,
    post_id: i32,
    comment_id: i32,
    form: &CommentForm,
) -> Result<CommentRecord>
where
    C: ConnectionTrait,
{
    let comment = load_owned(db, viewer, post_id, comment_id).await?;
    form.validate()?;
    let mut am: comment::ActiveModel = comment.into();
    am.text = Set(form.text.clone());
    let updated = am.update(db).await?;
    with_author(db, updated).await
}

pub async fn delete<C>(db: &C, viewer: i32, post_id: i32, comment_id: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let comment = load_owned(db, viewer, post_id, comment_id).await?;
    comment.delete(db).await?;
    tracing::info!(comment_id, post_id, "comment deleted");
    Ok(())
}
