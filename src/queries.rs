//! Listing queries and batch loading of what a listed post shows.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    prelude::DateTimeUtc, sea_query::Expr,
};

use crate::{
    entities::{category, comment, location, post, user},
    error::Result,
};

/// A post together with the rows its listing entry displays.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub post: post::Model,
    pub author: String,
    pub category: Option<category::Model>,
    pub location: Option<location::Model>,
    pub comment_count: i64,
}

fn newest_first(select: Select<post::Entity>) -> Select<post::Entity> {
    select
        .order_by_desc(post::Column::PubDate)
        .order_by_desc(post::Column::Id)
}

/// SQL form of [`crate::policy::is_publicly_visible`].
pub fn published_posts(now: DateTimeUtc) -> Select<post::Entity> {
    newest_first(
        post::Entity::find()
            .inner_join(category::Entity)
            .filter(post::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now))
            .filter(category::Column::IsPublished.eq(true)),
    )
}

/// Posts of a category already known to be published.
pub fn category_posts(category_id: i32, now: DateTimeUtc) -> Select<post::Entity> {
    newest_first(
        post::Entity::find()
            .filter(post::Column::CategoryId.eq(category_id))
            .filter(post::Column::IsPublished.eq(true))
            .filter(post::Column::PubDate.lte(now)),
    )
}

pub fn author_posts(author_id: i32, include_hidden: bool, now: DateTimeUtc) -> Select<post::Entity> {
    if include_hidden {
        newest_first(post::Entity::find().filter(post::Column::AuthorId.eq(author_id)))
    } else {
        published_posts(now).filter(post::Column::AuthorId.eq(author_id))
    }
}

/// Live comment totals for the given posts. Posts without comments are
/// absent from the map.
pub async fn comment_counts<C>(db: &C, post_ids: &[i32]) -> Result<HashMap<i32, i64>>
where
    C: ConnectionTrait,
{
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i64)> = comment::Entity::find()
        .select_only()
        .column(comment::Column::PostId)
        .column_as(Expr::col(comment::Column::Id).count(), "comment_count")
        .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
        .group_by(comment::Column::PostId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}

async fn by_id<C, E>(db: &C, ids: HashSet<i32>, id_column: E::Column) -> Result<HashMap<i32, E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: HasId,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = E::find().filter(id_column.is_in(ids)).all(db).await?;
    Ok(rows.into_iter().map(|row| (row.id(), row)).collect())
}

trait HasId {
    fn id(&self) -> i32;
}

impl HasId for user::Model {
    fn id(&self) -> i32 {
        self.id
    }
}

impl HasId for category::Model {
    fn id(&self) -> i32 {
        self.id
    }
}

impl HasId for location::Model {
    fn id(&self) -> i32 {
        self.id
    }
}

/// Loads authors, categories, locations and comment counts for a batch of
/// posts with one query each, keeping the input order.
pub async fn load_records<C>(db: &C, posts: Vec<post::Model>) -> Result<Vec<PostRecord>>
where
    C: ConnectionTrait,
{
    let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
    let authors = by_id::<_, user::Entity>(
        db,
        posts.iter().map(|p| p.author_id).collect(),
        user::Column::Id,
    )
    .await?;
    let categories = by_id::<_, category::Entity>(
        db,
        posts.iter().filter_map(|p| p.category_id).collect(),
        category::Column::Id,
    )
    .await?;
    let locations = by_id::<_, location::Entity>(
        db,
        posts.iter().filter_map(|p| p.location_id).collect(),
        location::Column::Id,
    )
    .await?;
    let counts = comment_counts(db, &post_ids).await?;

    Ok(posts
        .into_iter()
        .map(|post| PostRecord {
            author: authors
                .get(&post.author_id)
                .map(|author| author.username.clone())
                .unwrap_or_default(),
            category: post.category_id.and_then(|id| categories.get(&id).cloned()),
            location: post.location_id.and_then(|id| locations.get(&id).cloned()),
            comment_count: counts.get(&post.id).copied().unwrap_or(0),
            post,
        })
        .collect())
}

pub async fn load_record<C>(db: &C, post: post::Model) -> Result<PostRecord>
where
    C: ConnectionTrait,
{
    let mut records = load_records(db, vec![post.clone()]).await?;
    Ok(records.pop().unwrap_or(PostRecord {
        post,
        author: String::new(),
        category: None,
        location: None,
        comment_count: 0,
    }))
}
