use peel_core::error::PeelResult;
use peel_user::auth::Token;
use peel_user::follow;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use uuid::Uuid;

#[derive(serde::Serialize, serde::Deserialize)]
struct FollowBody {
    follow: follow::FollowEdge,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct FollowingBody {
    following: Vec<follow::FollowPeer>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct FollowersBody {
    followers: Vec<follow::FollowPeer>,
}

pub struct FollowRoutes<A>(std::marker::PhantomData<A>);

impl<A> FollowRoutes<A>
where
    A: follow::FollowUser
        + follow::UnfollowUser
        + follow::ListFollowing
        + follow::ListFollowers
        + peel_user::auth::Authenticate
        + Sized
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub fn router() -> axum::Router {
        axum::Router::new()
            .route("/follows/following", get(Self::following))
            .route("/follows/followers", get(Self::followers))
            .route(
                "/follows/:user_id",
                post(Self::follow).delete(Self::unfollow),
            )
    }

    async fn following(
        Extension(app): Extension<A>,
        token: Token,
    ) -> PeelResult<Json<FollowingBody>> {
        let authenticated = app.authenticate(token)?;
        Ok(Json(FollowingBody {
            following: app.list_following(authenticated).await?,
        }))
    }

    async fn followers(
        Extension(app): Extension<A>,
        token: Token,
    ) -> PeelResult<Json<FollowersBody>> {
        let authenticated = app.authenticate(token)?;
        Ok(Json(FollowersBody {
            followers: app.list_followers(authenticated).await?,
        }))
    }

    async fn follow(
        Extension(app): Extension<A>,
        token: Token,
        Path(user_id): Path<Uuid>,
    ) -> PeelResult<Json<FollowBody>> {
        let authenticated = app.authenticate(token)?;
        Ok(Json(FollowBody {
            follow: app.follow_user(authenticated, user_id).await?,
        }))
    }

    async fn unfollow(
        Extension(app): Extension<A>,
        token: Token,
        Path(user_id): Path<Uuid>,
    ) -> PeelResult<StatusCode> {
        let authenticated = app.authenticate(token)?;
        app.unfollow_user(authenticated, user_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
