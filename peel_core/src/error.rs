use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::borrow::Cow;
use std::collections::HashMap;

pub type PeelResult<T, E = PeelError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum PeelError {
    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("user does not exist")]
    CurrentUserDoesNotExist,

    #[error("username does not exist")]
    UsernameDoesNotExist,

    #[error("username is taken")]
    UsernameTaken,

    #[error("user not found")]
    UserNotFound,

    #[error("sticker not found")]
    StickerNotFound,

    #[error("follow not found")]
    FollowNotFound,

    #[error("duplicate sticker title: {0}")]
    DuplicateStickerTitle(String),

    #[error("already following this user")]
    AlreadyFollowing,

    #[error("users cannot follow themselves")]
    SelfFollow,

    #[error("an error occurred with the database")]
    Sqlx(#[from] sqlx::Error),

    #[error("an internal server error occurred")]
    Anyhow(#[from] anyhow::Error),
}

impl PeelError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::CurrentUserDoesNotExist => StatusCode::NOT_FOUND,
            Self::UsernameDoesNotExist => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UsernameTaken => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::StickerNotFound => StatusCode::NOT_FOUND,
            Self::FollowNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateStickerTitle(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::AlreadyFollowing => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SelfFollow => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for PeelError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                self.status_code(),
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Token"))]
                    .into_iter()
                    .collect::<HeaderMap>(),
                self.to_string(),
            )
                .into_response(),
            Self::Forbidden => (self.status_code(), ()).into_response(),
            Self::CurrentUserDoesNotExist => (self.status_code(), ()).into_response(),
            Self::UsernameDoesNotExist => unprocessable_entity_with_errors([(
                "username".into(),
                vec!["does not exist".into()],
            )]),
            Self::UsernameTaken => unprocessable_entity_with_errors([(
                "username".into(),
                vec!["username is taken".into()],
            )]),
            Self::UserNotFound => (self.status_code(), ()).into_response(),
            Self::StickerNotFound => (self.status_code(), ()).into_response(),
            Self::FollowNotFound => (self.status_code(), ()).into_response(),
            Self::DuplicateStickerTitle(title) => unprocessable_entity_with_errors([(
                "title".into(),
                vec![format!("duplicate sticker title: {title}").into()],
            )]),
            Self::AlreadyFollowing => unprocessable_entity_with_errors([(
                "follow".into(),
                vec!["already following this user".into()],
            )]),
            Self::SelfFollow => unprocessable_entity_with_errors([(
                "follow".into(),
                vec!["users cannot follow themselves".into()],
            )]),
            Self::Sqlx(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (self.status_code(), self.to_string()).into_response()
            }
            Self::Anyhow(ref e) => {
                tracing::error!("Generic error: {:?}", e);
                (self.status_code(), self.to_string()).into_response()
            }
        }
    }
}

#[derive(serde::Serialize)]
struct JsonErrors {
    errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
}

fn unprocessable_entity_with_errors(
    errors: impl Into<HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>>,
) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(JsonErrors {
            errors: errors.into(),
        }),
    )
        .into_response()
}
