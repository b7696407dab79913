//! Staff-only management of posts, categories and locations.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, Func},
};
use validator::Validate;

use crate::{
    entities::{category, location, post, user},
    error::{BlogError, Result},
    forms::{CategoryForm, LocationForm, ModerationForm},
    pagination::{self, Page},
    policy,
    queries::{self, PostRecord},
    service::posts,
};

pub async fn require_staff<C>(db: &C, viewer: i32) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let user = user::Entity::find_by_id(viewer)
        .one(db)
        .await?
        .ok_or(BlogError::Forbidden("resource"))?;
    policy::ensure_staff(&user)?;
    Ok(user)
}

/// Every post regardless of visibility, newest first. `q` matches a title
/// prefix or an author username prefix.
pub async fn list_posts<C>(db: &C, q: Option<&str>, page: Option<&str>) -> Result<Page<PostRecord>>
where
    C: ConnectionTrait,
{
    let mut select = post::Entity::find()
        .order_by_desc(post::Column::PubDate)
        .order_by_desc(post::Column::Id);
    if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
        select = select.inner_join(user::Entity).filter(
            Condition::any()
                .add(post::Column::Title.starts_with(q))
                .add(user::Column::Username.starts_with(q)),
        );
    }
    let page = pagination::fetch_page(db, select, page).await?;
    posts::load_page(db, page).await
}

pub async fn moderate_post<C>(db: &C, id: i32, form: &ModerationForm) -> Result<PostRecord>
where
    C: ConnectionTrait,
{
    let post = post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(BlogError::NotFound("post"))?;
    form.validate()?;
    if let Some(category_id) = form.category_id {
        if category::Entity::find_by_id(category_id).one(db).await?.is_none() {
            return Err(BlogError::invalid("category_id", "unknown category"));
        }
    }
    if let Some(location_id) = form.location_id {
        if location::Entity::find_by_id(location_id).one(db).await?.is_none() {
            return Err(BlogError::invalid("location_id", "unknown location"));
        }
    }
    let mut am: post::ActiveModel = post.into();
    if let Some(is_published) = form.is_published {
        am.is_published = Set(is_published);
    }
    if let Some(pub_date) = form.pub_date {
        am.pub_date = Set(pub_date);
    }
    if let Some(category_id) = form.category_id {
        am.category_id = Set(Some(category_id));
    }
    if let Some(location_id) = form.location_id {
        am.location_id = Set(Some(location_id));
    }
    if let Some(title) = &form.title {
        am.title = Set(title.clone());
    }
    if let Some(text) = &form.text {
        am.text = Set(text.clone());
    }
    let updated = am.update(db).await?;
    tracing::info!(post_id = id, is_published = updated.is_published, "post moderated");
    queries::load_record(db, updated).await
}

/// Number of posts per foreign key value.
async fn post_counts<C>(db: &C, column: post::Column, ids: Vec<i32>) -> Result<HashMap<i32, i64>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Option<i32>, i64)> = post::Entity::find()
        .select_only()
        .column(column)
        .column_as(Expr::col(post::Column::Id).count(), "post_count")
        .filter(column.is_in(ids))
        .group_by(column)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(id, count)| id.map(|id| (id, count)))
        .collect())
}

/// Case-insensitive prefix match on the title.
pub async fn list_categories<C>(db: &C, q: Option<&str>) -> Result<Vec<(category::Model, i64)>>
where
    C: ConnectionTrait,
{
    let mut select = category::Entity::find().order_by_asc(category::Column::Title);
    if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(category::Column::Title)))
                .like(format!("{}%", q.to_lowercase())),
        );
    }
    let categories = select.all(db).await?;
    let counts = post_counts(
        db,
        post::Column::CategoryId,
        categories.iter().map(|c| c.id).collect(),
    )
    .await?;
    Ok(categories
        .into_iter()
        .map(|c| {
            let count = counts.get(&c.id).copied().unwrap_or(0);
            (c, count)
        })
        .collect())
}

async fn slug_taken<C>(db: &C, slug: &str, except: Option<i32>) -> Result<bool>
where
    C: ConnectionTrait,
{
    let mut select = category::Entity::find().filter(category::Column::Slug.eq(slug));
    if let Some(id) = except {
        select = select.filter(category::Column::Id.ne(id));
    }
    Ok(select.one(db).await?.is_some())
}

pub async fn create_category<C>(db: &C, form: &CategoryForm) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    form.validate()?;
    if slug_taken(db, &form.slug, None).await? {
        return Err(BlogError::invalid("slug", "slug already in use"));
    }
    let created = category::ActiveModel {
        title: Set(form.title.clone()),
        description: Set(form.description.clone()),
        slug: Set(form.slug.clone()),
        is_published: Set(form.is_published.unwrap_or(true)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(category = %created.slug, "category created");
    Ok(created)
}

/// Returns the updated category with its post count.
pub async fn update_category<C>(db: &C, id: i32, form: &CategoryForm) -> Result<(category::Model, i64)>
where
    C: ConnectionTrait,
{
    let category = category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(BlogError::NotFound("category"))?;
    form.validate()?;
    if slug_taken(db, &form.slug, Some(id)).await? {
        return Err(BlogError::invalid("slug", "slug already in use"));
    }
    let mut am: category::ActiveModel = category.into();
    am.title = Set(form.title.clone());
    am.description = Set(form.description.clone());
    am.slug = Set(form.slug.clone());
    if let Some(is_published) = form.is_published {
        am.is_published = Set(is_published);
    }
    let updated = am.update(db).await?;
    let counts = post_counts(db, post::Column::CategoryId, vec![id]).await?;
    Ok((updated, counts.get(&id).copied().unwrap_or(0)))
}

/// Posts of the category stay, with their category cleared.
pub async fn delete_category<C>(db: &C, id: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let category = category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(BlogError::NotFound("category"))?;
    category.delete(db).await?;
    tracing::info!(category_id = id, "category deleted");
    Ok(())
}

pub async fn list_locations<C>(db: &C, q: Option<&str>) -> Result<Vec<(location::Model, i64)>>
where
    C: ConnectionTrait,
{
    let mut select = location::Entity::find().order_by_asc(location::Column::Name);
    if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
        select = select.filter(location::Column::Name.starts_with(q));
    }
    let locations = select.all(db).await?;
    let counts = post_counts(
        db,
        post::Column::LocationId,
        locations.iter().map(|l| l.id).collect(),
    )
    .await?;
    Ok(locations
        .into_iter()
        .map(|l| {
            let count = counts.get(&l.id).copied().unwrap_or(0);
            (l, count)
        })
        .collect())
}

pub async fn create_location<C>(db: &C, form: &LocationForm) -> Result<location::Model>
where
    C: ConnectionTrait,
{
    form.validate()?;
    let created = location::ActiveModel {
        name: Set(form.name.clone()),
        is_published: Set(form.is_published.unwrap_or(true)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(location_id = created.id, "location created");
    Ok(created)
}

/// Returns the updated location with its post count.
pub async fn update_location<C>(db: &C, id: i32, form: &LocationForm) -> Result<(location::Model, i64)>
where
    C: ConnectionTrait,
{
    let location = location::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(BlogError::NotFound("location"))?;
    form.validate()?;
    let mut am: location::ActiveModel = location.into();
    am.name = Set(form.name.clone());
    if let Some(is_published) = form.is_published {
        am.is_published = Set(is_published);
    }
    let updated = am.update(db).await?;
    let counts = post_counts(db, post::Column::LocationId, vec![id]).await?;
    Ok((updated, counts.get(&id).copied().unwrap_or(0)))
}

/// Posts at the location stay, with their location cleared.
pub async fn delete_location<C>(db: &C, id: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let location = location::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(BlogError::NotFound("location"))?;
    location.delete(db).await?;
    tracing::info!(location_id = id, "location deleted");
    Ok(())
}
