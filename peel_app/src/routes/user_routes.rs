use peel_core::error::PeelResult;
use peel_user::auth::Token;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use uuid::Uuid;

#[derive(serde::Serialize, serde::Deserialize, Debug)]
struct UserBody<T> {
    user: T,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct UsersBody {
    users: Vec<peel_user::User>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ProfileBody<T = peel_user::Profile> {
    profile: T,
}

pub struct UserRoutes<A>(std::marker::PhantomData<A>);

impl<A> UserRoutes<A>
where
    A: peel_user::CreateUser
        + peel_user::Login
        + peel_user::FetchCurrentUser
        + peel_user::ListUsers
        + peel_user::FetchProfile
        + peel_user::UpdateProfile
        + peel_user::DeleteProfile
        + peel_user::auth::Authenticate
        + Sized
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub fn router() -> axum::Router {
        axum::Router::new()
            .route("/users", get(Self::list_users).post(Self::create))
            .route("/users/login", post(Self::login))
            .route(
                "/user",
                get(Self::current_user)
                    .put(Self::update_current_user)
                    .delete(Self::delete_current_user),
            )
            .route(
                "/users/:user_id",
                get(Self::profile)
                    .put(Self::update_profile)
                    .delete(Self::delete_profile),
            )
    }

    async fn create(
        Extension(app): Extension<A>,
        Json(body): Json<UserBody<peel_user::NewUser>>,
    ) -> PeelResult<Json<UserBody<peel_user::SignedUser>>> {
        Ok(Json(UserBody {
            user: app.create_user(body.user).await?,
        }))
    }

    async fn login(
        Extension(app): Extension<A>,
        Json(body): Json<UserBody<peel_user::LoginUser>>,
    ) -> PeelResult<Json<UserBody<peel_user::SignedUser>>> {
        Ok(Json(UserBody {
            user: app.login(body.user).await?,
        }))
    }

    async fn current_user(
        Extension(app): Extension<A>,
        token: Token,
    ) -> PeelResult<Json<UserBody<peel_user::SignedUser>>> {
        let authenticated = app.authenticate(token)?;
        Ok(Json(UserBody {
            user: app.fetch_current_user(authenticated).await?,
        }))
    }

    async fn list_users(Extension(app): Extension<A>) -> PeelResult<Json<UsersBody>> {
        Ok(Json(UsersBody {
            users: app.list_users().await?,
        }))
    }

    async fn profile(
        Extension(app): Extension<A>,
        Path(user_id): Path<Uuid>,
    ) -> PeelResult<Json<ProfileBody>> {
        Ok(Json(ProfileBody {
            profile: app.fetch_profile(user_id).await?,
        }))
    }

    async fn update_current_user(
        Extension(app): Extension<A>,
        token: Token,
        Json(body): Json<ProfileBody<peel_user::ProfileUpdate>>,
    ) -> PeelResult<Json<ProfileBody>> {
        let authenticated = app.authenticate(token)?;
        let user_id = authenticated.0 .0;
        Ok(Json(ProfileBody {
            profile: app
                .update_profile(authenticated, user_id, body.profile)
                .await?,
        }))
    }

    async fn delete_current_user(
        Extension(app): Extension<A>,
        token: Token,
    ) -> PeelResult<StatusCode> {
        let authenticated = app.authenticate(token)?;
        let user_id = authenticated.0 .0;
        app.delete_profile(authenticated, user_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    async fn update_profile(
        Extension(app): Extension<A>,
        token: Token,
        Path(user_id): Path<Uuid>,
        Json(body): Json<ProfileBody<peel_user::ProfileUpdate>>,
    ) -> PeelResult<Json<ProfileBody>> {
        let authenticated = app.authenticate(token)?;
        Ok(Json(ProfileBody {
            profile: app
                .update_profile(authenticated, user_id, body.profile)
                .await?,
        }))
    }

    async fn delete_profile(
        Extension(app): Extension<A>,
        token: Token,
        Path(user_id): Path<Uuid>,
    ) -> PeelResult<StatusCode> {
        let authenticated = app.authenticate(token)?;
        app.delete_profile(authenticated, user_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
