//! HTTP surface: one `#[OpenApi]` impl per resource, mounted on one router.

mod accounts;
mod admin;
mod comments;
mod posts;
mod profiles;
pub mod views;

use poem::{
    Endpoint, EndpointExt, Response, Route,
    middleware::{Cors, Tracing},
};
use poem_openapi::{OpenApiService, Tags};

use self::{
    accounts::AccountsApi, admin::AdminApi, comments::CommentsApi, posts::PostsApi,
    profiles::ProfilesApi,
};
use crate::{error::render_error, state::AppState};

#[derive(Tags)]
enum ApiTags {
    /// Listings, detail and authoring of posts
    Posts,
    /// Comments under posts
    Comments,
    /// User profiles
    Profiles,
    /// Registration and login
    Auth,
    /// Staff moderation
    Admin,
}

/// Builds the whole application: API routes, Swagger UI at `/docs`, shared
/// state and the JSON error renderer.
pub fn build_app(state: AppState) -> impl Endpoint<Output = Response> {
    let api = OpenApiService::new(
        (
            PostsApi {
                state: state.clone(),
            },
            CommentsApi {
                state: state.clone(),
            },
            ProfilesApi {
                state: state.clone(),
            },
            AccountsApi {
                state: state.clone(),
            },
            AdminApi {
                state: state.clone(),
            },
        ),
        "Blogicum API",
        env!("CARGO_PKG_VERSION"),
    );
    let ui = api.swagger_ui();

    Route::new()
        .nest("/docs", ui)
        .nest("/", api)
        .with(Cors::new())
        .with(Tracing)
        .data(state)
        .catch_all_error(render_error)
}
