use poem_openapi::{
    OpenApi,
    param::{Path, Query},
    payload::Json,
};

use super::{
    ApiTags,
    views::{CategoryAdminView, LocationAdminView, PostPage, PostView},
};
use crate::{
    auth::BearerAuth,
    forms::{CategoryForm, LocationForm, ModerationForm},
    service::moderation,
    state::AppState,
};

/// Staff-only moderation. Every handler checks the staff flag first.
pub struct AdminApi {
    pub(crate) state: AppState,
}

#[OpenApi(prefix_path = "/admin", tag = "ApiTags::Admin")]
impl AdminApi {
    /// All posts, searchable by title or author prefix
    #[oai(path = "/posts", method = "get")]
    async fn posts(
        &self,
        auth: BearerAuth,
        Query(q): Query<Option<String>>,
        Query(page): Query<Option<String>>,
    ) -> poem::Result<Json<PostPage>> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        let page = moderation::list_posts(db, q.as_deref(), page.as_deref()).await?;
        Ok(Json(page.into()))
    }

    /// Publish, hide, reschedule or refile a post
    #[oai(path = "/posts/:id", method = "put")]
    async fn moderate_post(
        &self,
        auth: BearerAuth,
        Path(id): Path<i32>,
        Json(form): Json<ModerationForm>,
    ) -> poem::Result<Json<PostView>> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        let record = moderation::moderate_post(db, id, &form).await?;
        Ok(Json(record.into()))
    }

    #[oai(path = "/categories", method = "get")]
    async fn categories(
        &self,
        auth: BearerAuth,
        Query(q): Query<Option<String>>,
    ) -> poem::Result<Json<Vec<CategoryAdminView>>> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        let rows = moderation::list_categories(db, q.as_deref()).await?;
        Ok(Json(
            rows.into_iter()
                .map(|(category, count)| CategoryAdminView::new(category, count))
                .collect(),
        ))
    }

    #[oai(path = "/categories", method = "post")]
    async fn create_category(
        &self,
        auth: BearerAuth,
        Json(form): Json<CategoryForm>,
    ) -> poem::Result<Json<CategoryAdminView>> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        let created = moderation::create_category(db, &form).await?;
        Ok(Json(CategoryAdminView::new(created, 0)))
    }

    #[oai(path = "/categories/:id", method = "put")]
    async fn update_category(
        &self,
        auth: BearerAuth,
        Path(id): Path<i32>,
        Json(form): Json<CategoryForm>,
    ) -> poem::Result<Json<CategoryAdminView>> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        let (updated, count) = moderation::update_category(db, id, &form).await?;
        Ok(Json(CategoryAdminView::new(updated, count)))
    }

    /// Delete a category; its posts lose their category
    #[oai(path = "/categories/:id", method = "delete")]
    async fn delete_category(&self, auth: BearerAuth, Path(id): Path<i32>) -> poem::Result<()> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        moderation::delete_category(db, id).await?;
        Ok(())
    }

    #[oai(path = "/locations", method = "get")]
    async fn locations(
        &self,
        auth: BearerAuth,
        Query(q): Query<Option<String>>,
    ) -> poem::Result<Json<Vec<LocationAdminView>>> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        let rows = moderation::list_locations(db, q.as_deref()).await?;
        Ok(Json(
            rows.into_iter()
                .map(|(location, count)| LocationAdminView::new(location, count))
                .collect(),
        ))
    }

    #[oai(path = "/locations", method = "post")]
    async fn create_location(
        &self,
        auth: BearerAuth,
        Json(form): Json<LocationForm>,
    ) -> poem::Result<Json<LocationAdminView>> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        let created = moderation::create_location(db, &form).await?;
        Ok(Json(LocationAdminView::new(created, 0)))
    }

    #[oai(path = "/locations/:id", method = "put")]
    async fn update_location(
        &self,
        auth: BearerAuth,
        Path(id): Path<i32>,
        Json(form): Json<LocationForm>,
    ) -> poem::Result<Json<LocationAdminView>> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        let (updated, count) = moderation::update_location(db, id, &form).await?;
        Ok(Json(LocationAdminView::new(updated, count)))
    }

    /// Delete a location; its posts lose their location
    #[oai(path = "/locations/:id", method = "delete")]
    async fn delete_location(&self, auth: BearerAuth, Path(id): Path<i32>) -> poem::Result<()> {
        let db = &self.state.db;
        moderation::require_staff(db, auth.0.sub).await?;
        moderation::delete_location(db, id).await?;
        Ok(())
    }
}
