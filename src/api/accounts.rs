use poem_openapi::{OpenApi, payload::Json};

use super::{
    ApiTags,
    views::{AccountView, TokenView},
};
use crate::{
    forms::{LoginForm, RegistrationForm},
    service::accounts,
    state::AppState,
};

pub struct AccountsApi {
    pub(crate) state: AppState,
}

#[OpenApi(tag = "ApiTags::Auth")]
impl AccountsApi {
    /// Sign up
    #[oai(path = "/auth/registration", method = "post")]
    async fn register(&self, Json(form): Json<RegistrationForm>) -> poem::Result<Json<AccountView>> {
        let user = accounts::register(&self.state.db, &form).await?;
        Ok(Json(user.into()))
    }

    /// Exchange credentials for a bearer token
    #[oai(path = "/auth/login", method = "post")]
    async fn login(&self, Json(form): Json<LoginForm>) -> poem::Result<Json<TokenView>> {
        let (user, token) = accounts::login(&self.state.db, &self.state.tokens, &form).await?;
        Ok(Json(TokenView {
            access_token: token,
            token_type: "Bearer".to_owned(),
            username: user.username,
        }))
    }
}
