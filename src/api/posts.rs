use poem_openapi::{
    OpenApi,
    param::{Path, Query},
    payload::Json,
};

use super::{
    ApiTags,
    views::{CategoryPage, CommentView, PostChoices, PostDetail, PostEditPage, PostPage, PostView},
};
use crate::{
    auth::{BearerAuth, Viewer},
    forms::PostForm,
    queries,
    service::posts,
    state::AppState,
};

pub struct PostsApi {
    pub(crate) state: AppState,
}

#[OpenApi(tag = "ApiTags::Posts")]
impl PostsApi {
    /// Public posts, newest first
    #[oai(path = "/", method = "get")]
    async fn index(&self, Query(page): Query<Option<String>>) -> poem::Result<Json<PostPage>> {
        let page = posts::index(&self.state.db, page.as_deref()).await?;
        Ok(Json(page.into()))
    }

    /// Post with its comments
    #[oai(path = "/posts/:id", method = "get")]
    async fn detail(&self, viewer: Viewer, Path(id): Path<i32>) -> poem::Result<Json<PostDetail>> {
        let (post, comments) = posts::detail(&self.state.db, viewer.user_id(), id).await?;
        Ok(Json(PostDetail {
            post: post.into(),
            comments: comments.into_iter().map(CommentView::from).collect(),
        }))
    }

    /// Published posts of a published category
    #[oai(path = "/category/:slug", method = "get")]
    async fn category(
        &self,
        Path(slug): Path<String>,
        Query(page): Query<Option<String>>,
    ) -> poem::Result<Json<CategoryPage>> {
        let (category, posts) =
            posts::category_listing(&self.state.db, &slug, page.as_deref()).await?;
        Ok(Json(CategoryPage {
            category: category.into(),
            posts: posts.into(),
        }))
    }

    /// Categories and locations for a new post
    #[oai(path = "/posts/create", method = "get")]
    async fn create_form(&self, _auth: BearerAuth) -> poem::Result<Json<PostChoices>> {
        let (categories, locations) = posts::form_choices(&self.state.db).await?;
        Ok(Json(PostChoices::new(categories, locations)))
    }

    /// Publish a post
    #[oai(path = "/posts/create", method = "post")]
    async fn create(&self, auth: BearerAuth, Json(form): Json<PostForm>) -> poem::Result<Json<PostView>> {
        let db = &self.state.db;
        let created = posts::create(db, auth.0.sub, &form).await?;
        Ok(Json(queries::load_record(db, created).await?.into()))
    }

    /// Current values of the author's post
    #[oai(path = "/posts/:id/edit", method = "get")]
    async fn edit_form(&self, auth: BearerAuth, Path(id): Path<i32>) -> poem::Result<Json<PostEditPage>> {
        let db = &self.state.db;
        let post = posts::load_owned(db, auth.0.sub, id).await?;
        let (categories, locations) = posts::form_choices(db).await?;
        Ok(Json(PostEditPage {
            post: queries::load_record(db, post).await?.into(),
            choices: PostChoices::new(categories, locations),
        }))
    }

    /// Change the author's post
    #[oai(path = "/posts/:id/edit", method = "post")]
    async fn edit(
        &self,
        auth: BearerAuth,
        Path(id): Path<i32>,
        Json(form): Json<PostForm>,
    ) -> poem::Result<Json<PostView>> {
        let db = &self.state.db;
        let updated = posts::update(db, auth.0.sub, id, &form).await?;
        Ok(Json(queries::load_record(db, updated).await?.into()))
    }

    /// The post about to be deleted
    #[oai(path = "/posts/:id/delete", method = "get")]
    async fn delete_form(&self, auth: BearerAuth, Path(id): Path<i32>) -> poem::Result<Json<PostView>> {
        let db = &self.state.db;
        let post = posts::load_owned(db, auth.0.sub, id).await?;
        Ok(Json(queries::load_record(db, post).await?.into()))
    }

    /// Delete the author's post and its comments
    #[oai(path = "/posts/:id/delete", method = "post")]
    async fn delete(&self, auth: BearerAuth, Path(id): Path<i32>) -> poem::Result<()> {
        posts::delete(&self.state.db, auth.0.sub, id).await?;
        Ok(())
    }
}
