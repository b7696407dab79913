use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use validator::Validate;

use crate::{
    entities::{category, location, post},
    error::{BlogError, Result},
    forms::PostForm,
    pagination::{self, Page},
    policy,
    queries::{self, PostRecord},
    service::comments::{self, CommentRecord},
};

pub(crate) async fn load_page<C>(db: &C, page: Page<post::Model>) -> Result<Page<PostRecord>>
where
    C: ConnectionTrait,
{
    let Page {
        items,
        number,
        num_pages,
        count,
    } = page;
    Ok(Page {
        items: queries::load_records(db, items).await?,
        number,
        num_pages,
        count,
    })
}

/// Public feed, newest first.
pub async fn index<C>(db: &C, page: Option<&str>) -> Result<Page<PostRecord>>
where
    C: ConnectionTrait,
{
    let posts = pagination::fetch_page(db, queries::published_posts(Utc::now()), page).await?;
    load_page(db, posts).await
}

pub async fn category_listing<C>(
    db: &C,
    slug: &str,
    page: Option<&str>,
) -> Result<(category::Model, Page<PostRecord>)>
where
    C: ConnectionTrait,
{
    let category = category::Entity::find()
        .filter(category::Column::Slug.eq(slug))
        .filter(category::Column::IsPublished.eq(true))
        .one(db)
        .await?
        .ok_or(BlogError::NotFound("category"))?;
    let posts =
        pagination::fetch_page(db, queries::category_posts(category.id, Utc::now()), page).await?;
    Ok((category, load_page(db, posts).await?))
}

/// Loads a post the viewer is allowed to see. Hidden posts look exactly like
/// missing ones to everyone but their author.
pub(crate) async fn visible_post<C>(db: &C, viewer: Option<i32>, id: i32) -> Result<post::Model>
where
    C: ConnectionTrait,
{
    let post = post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(BlogError::NotFound("post"))?;
    let category = match post.category_id {
        Some(category_id) => category::Entity::find_by_id(category_id).one(db).await?,
        None => None,
    };
    if policy::can_view(viewer, &post, category.as_ref(), Utc::now()) {
        Ok(post)
    } else {
        Err(BlogError::NotFound("post"))
    }
}

pub async fn detail<C>(
    db: &C,
    viewer: Option<i32>,
    id: i32,
) -> Result<(PostRecord, Vec<CommentRecord>)>
where
    C: ConnectionTrait,
{
    let post = visible_post(db, viewer, id).await?;
    let comments = comments::for_post(db, &post).await?;
    Ok((queries::load_record(db, post).await?, comments))
}

/// Categories and locations a post can be filed under.
pub async fn form_choices<C>(db: &C) -> Result<(Vec<category::Model>, Vec<location::Model>)>
where
    C: ConnectionTrait,
{
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Title)
        .all(db)
        .await?;
    let locations = location::Entity::find()
        .order_by_asc(location::Column::Name)
        .all(db)
        .await?;
    Ok((categories, locations))
}

async fn check_references<C>(db: &C, form: &PostForm) -> Result<()>
where
    C: ConnectionTrait,
{
    if category::Entity::find_by_id(form.category_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(BlogError::invalid("category_id", "unknown category"));
    }
    if let Some(location_id) = form.location_id {
        if location::Entity::find_by_id(location_id).one(db).await?.is_none() {
            return Err(BlogError::invalid("location_id", "unknown location"));
        }
    }
    Ok(())
}

pub async fn create<C>(db: &C, author_id: i32, form: &PostForm) -> Result<post::Model>
where
    C: ConnectionTrait,
{
    form.validate()?;
    check_references(db, form).await?;
    let now = Utc::now();
    let created = post::ActiveModel {
        title: Set(form.title.clone()),
        text: Set(form.text.clone()),
        pub_date: Set(form.pub_date.unwrap_or(now)),
        image: Set(form.image.clone()),
        is_published: Set(true),
        created_at: Set(now),
        author_id: Set(author_id),
        location_id: Set(form.location_id),
        category_id: Set(Some(form.category_id)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(post_id = created.id, author_id, "post created");
    Ok(created)
}

/// Loads a post for mutation: 404 when missing, 403 when not the viewer's.
pub async fn load_owned<C>(db: &C, viewer: i32, id: i32) -> Result<post::Model>
where
    C: ConnectionTrait,
{
    let post = post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(BlogError::NotFound("post"))?;
    policy::ensure_author(viewer, &post)?;
    Ok(post)
}

pub async fn update<C>(db: &C, viewer: i32, id: i32, form: &PostForm) -> Result<post::Model>
where
    C: ConnectionTrait,
{
    let post = load_owned(db, viewer, id).await?;
    form.validate()?;
    check_references(db, form).await?;
    let pub_date = form.pub_date.unwrap_or(post.pub_date);
    let mut am: post::ActiveModel = post.into();
    am.title = Set(form.title.clone());
    am.text = Set(form.text.clone());
    am.pub_date = Set(pub_date);
    am.image = Set(form.image.clone());
    am.category_id = Set(Some(form.category_id));
    am.location_id = Set(form.location_id);
    let updated = am.update(db).await?;
    tracing::info!(post_id = updated.id, "post updated");
    Ok(updated)
}

/// Deletes the post; its comments go with it.
pub async fn delete<C>(db: &C, viewer: i32, id: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let post = load_owned(db, viewer, id).await?;
    post.delete(db).await?;
    tracing::info!(post_id = id, "post deleted");
    Ok(())
}
