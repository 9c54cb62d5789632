use peel_core::error::PeelResult;
use peel_user::auth::Token;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use uuid::Uuid;

#[derive(serde::Serialize, serde::Deserialize)]
struct StickerBody<T = peel_sticker::Sticker> {
    sticker: T,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct MultipleStickersBody {
    stickers: Vec<peel_sticker::Sticker>,
}

pub struct StickerRoutes<A>(std::marker::PhantomData<A>);

impl<A> StickerRoutes<A>
where
    A: peel_sticker::ListStickers
        + peel_sticker::ListStickersByUser
        + peel_sticker::ListMyStickers
        + peel_sticker::ListFeed
        + peel_sticker::FetchSticker
        + peel_sticker::CreateSticker
        + peel_sticker::UpdateSticker
        + peel_sticker::DeleteSticker
        + peel_user::auth::Authenticate
        + Sized
        + Clone
        + Send
        + Sync
        + 'static,
{
    pub fn router() -> axum::Router {
        axum::Router::new()
            .route(
                "/stickers",
                get(Self::list_stickers).post(Self::create_sticker),
            )
            .route("/stickers/feed", get(Self::feed))
            .route("/stickers/mine", get(Self::my_stickers))
            .route(
                "/stickers/:sticker_id",
                get(Self::get_sticker)
                    .put(Self::update_sticker)
                    .delete(Self::delete_sticker),
            )
            .route("/users/:user_id/stickers", get(Self::stickers_by_user))
    }

    async fn list_stickers(Extension(app): Extension<A>) -> PeelResult<Json<MultipleStickersBody>> {
        Ok(Json(MultipleStickersBody {
            stickers: app.list_stickers().await?,
        }))
    }

    async fn stickers_by_user(
        Extension(app): Extension<A>,
        Path(user_id): Path<Uuid>,
    ) -> PeelResult<Json<MultipleStickersBody>> {
        Ok(Json(MultipleStickersBody {
            stickers: app.list_stickers_by_user(user_id).await?,
        }))
    }

    async fn my_stickers(
        Extension(app): Extension<A>,
        token: Token,
    ) -> PeelResult<Json<MultipleStickersBody>> {
        let authenticated = app.authenticate(token)?;
        Ok(Json(MultipleStickersBody {
            stickers: app.list_my_stickers(authenticated).await?,
        }))
    }

    async fn feed(
        Extension(app): Extension<A>,
        token: Token,
    ) -> PeelResult<Json<MultipleStickersBody>> {
        let authenticated = app.authenticate(token)?;
        Ok(Json(MultipleStickersBody {
            stickers: app.list_feed(authenticated).await?,
        }))
    }

    async fn get_sticker(
        Extension(app): Extension<A>,
        Path(sticker_id): Path<Uuid>,
    ) -> PeelResult<Json<StickerBody>> {
        Ok(Json(StickerBody {
            sticker: app.fetch_sticker(sticker_id).await?,
        }))
    }

    async fn create_sticker(
        Extension(app): Extension<A>,
        token: Token,
        Json(body): Json<StickerBody<peel_sticker::StickerCreate>>,
    ) -> PeelResult<Json<StickerBody>> {
        let authenticated = app.authenticate(token)?;
        Ok(Json(StickerBody {
            sticker: app.create_sticker(authenticated, body.sticker).await?,
        }))
    }

    async fn update_sticker(
        Extension(app): Extension<A>,
        token: Token,
        Path(sticker_id): Path<Uuid>,
        Json(body): Json<StickerBody<peel_sticker::StickerUpdate>>,
    ) -> PeelResult<Json<StickerBody>> {
        let authenticated = app.authenticate(token)?;
        Ok(Json(StickerBody {
            sticker: app
                .update_sticker(authenticated, sticker_id, body.sticker)
                .await?,
        }))
    }

    async fn delete_sticker(
        Extension(app): Extension<A>,
        token: Token,
        Path(sticker_id): Path<Uuid>,
    ) -> PeelResult<StatusCode> {
        let authenticated = app.authenticate(token)?;
        app.delete_sticker(authenticated, sticker_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
