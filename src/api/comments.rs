use poem_openapi::{OpenApi, param::Path, payload::Json};

use super::{ApiTags, views::CommentView};
use crate::{
    auth::{BearerAuth, Viewer},
    forms::CommentForm,
    service::comments,
    state::AppState,
};

pub struct CommentsApi {
    pub(crate) state: AppState,
}

#[OpenApi(tag = "ApiTags::Comments")]
impl CommentsApi {
    /// Comments of a visible post, oldest first
    #[oai(path = "/posts/:id/comment", method = "get")]
    async fn list(&self, viewer: Viewer, Path(id): Path<i32>) -> poem::Result<Json<Vec<CommentView>>> {
        let comments = comments::list(&self.state.db, viewer.user_id(), id).await?;
        Ok(Json(comments.into_iter().map(CommentView::from).collect()))
    }

    /// Comment on a post
    #[oai(path = "/posts/:id/comment", method = "post")]
    async fn create(
        &self,
        auth: BearerAuth,
        Path(id): Path<i32>,
        Json(form): Json<CommentForm>,
    ) -> poem::Result<Json<CommentView>> {
        let created = comments::create(&self.state.db, auth.0.sub, id, &form).await?;
        Ok(Json(created.into()))
    }

    #[oai(path = "/posts/:id/comment/:comment_id/edit", method = "get")]
    async fn edit_form(
        &self,
        auth: BearerAuth,
        Path(id): Path<i32>,
        Path(comment_id): Path<i32>,
    ) -> poem::Result<Json<CommentView>> {
        let comment = comments::owned_record(&self.state.db, auth.0.sub, id, comment_id).await?;
        Ok(Json(comment.into()))
    }

    /// Change the viewer's comment
    #[oai(path = "/posts/:id/comment/:comment_id/edit", method = "post")]
    async fn edit(
        &self,
        auth: BearerAuth,
        Path(id): Path<i32>,
        Path(comment_id): Path<i32>,
        Json(form): Json<CommentForm>,
    ) -> poem::Result<Json<CommentView>> {
        let updated = comments::update(&self.state.db, auth.0.sub, id, comment_id, &form).await?;
        Ok(Json(updated.into()))
    }

    #[oai(path = "/posts/:id/comment/:comment_id/delete", method = "get")]
    async fn delete_form(
        &self,
        auth: BearerAuth,
        Path(id): Path<i32>,
        Path(comment_id): Path<i32>,
    ) -> poem::Result<Json<CommentView>> {
        let comment = comments::owned_record(&self.state.db, auth.0.sub, id, comment_id).await?;
        Ok(Json(comment.into()))
    }

    /// Delete the viewer's comment
    #[oai(path = "/posts/:id/comment/:comment_id/delete", method = "post")]
    async fn delete(
        &self,
        auth: BearerAuth,
        Path(id): Path<i32>,
        Path(comment_id): Path<i32>,
    ) -> poem::Result<()> {
        comments::delete(&self.state.db, auth.0.sub, id, comment_id).await?;
        Ok(())
    }
}
