use poem_openapi::{
    OpenApi,
    param::{Path, Query},
    payload::Json,
};

use super::{
    ApiTags,
    views::{AccountView, ProfilePage},
};
use crate::{
    auth::{BearerAuth, Viewer},
    forms::ProfileForm,
    service::profiles,
    state::AppState,
};

pub struct ProfilesApi {
    pub(crate) state: AppState,
}

#[OpenApi(tag = "ApiTags::Profiles")]
impl ProfilesApi {
    /// A user's profile and posts
    #[oai(path = "/profile/:username", method = "get")]
    async fn profile(
        &self,
        viewer: Viewer,
        Path(username): Path<String>,
        Query(page): Query<Option<String>>,
    ) -> poem::Result<Json<ProfilePage>> {
        let (owner, posts) =
            profiles::profile(&self.state.db, viewer.user_id(), &username, page.as_deref()).await?;
        Ok(Json(ProfilePage {
            profile: owner.into(),
            posts: posts.into(),
        }))
    }

    #[oai(path = "/profile/:username/edit", method = "get")]
    async fn edit_form(&self, auth: BearerAuth, Path(username): Path<String>) -> poem::Result<Json<AccountView>> {
        let owner = profiles::load_own(&self.state.db, auth.0.sub, &username).await?;
        Ok(Json(owner.into()))
    }

    /// Change the viewer's own profile
    #[oai(path = "/profile/:username/edit", method = "post")]
    async fn edit(
        &self,
        auth: BearerAuth,
        Path(username): Path<String>,
        Json(form): Json<ProfileForm>,
    ) -> poem::Result<Json<AccountView>> {
        let updated = profiles::update(&self.state.db, auth.0.sub, &username, &form).await?;
        Ok(Json(updated.into()))
    }
}
