mod follow_routes;
mod sticker_routes;
mod user_routes;

use crate::app::App;

use axum::routing::Router;
use entrait::Impl;

/// Axum API router for the real app.
pub fn api_router() -> axum::Router {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(user_routes::UserRoutes::<Impl<App>>::router())
            .merge(sticker_routes::StickerRoutes::<Impl<App>>::router())
            .merge(follow_routes::FollowRoutes::<Impl<App>>::router()),
    )
}
