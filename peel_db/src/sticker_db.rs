use crate::DbResultExt;
use crate::GetPgPool;
use peel_core::access::OwnedResource;
use peel_core::error::{PeelError, PeelResult};
use peel_core::timestamp::Timestamptz;
use peel_core::UserId;

use entrait::entrait_export as entrait;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, sqlx::FromRow)]
pub struct Sticker {
    pub sticker_id: Uuid,
    pub title: String,
    pub background_color: String,
    pub pattern_url: Option<String>,
    pub image_url: Option<String>,
    pub font: String,
    pub font_color: String,
    pub message: String,
    pub draft: bool,
    pub created_at: Timestamptz,
    pub updated_at: Timestamptz,
    pub creator_id: Uuid,
    pub creator_username: String,
}

impl OwnedResource for Sticker {
    fn owner_id(&self) -> UserId {
        UserId(self.creator_id)
    }
}

/// Filter dimensions compose with AND; `None` leaves a dimension unconstrained.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Filter {
    pub sticker_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
    /// Only stickers whose creator is followed by this user (the feed).
    pub followed_by: Option<Uuid>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NewSticker<'a> {
    pub title: &'a str,
    pub background_color: &'a str,
    pub pattern_url: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub font: &'a str,
    pub font_color: &'a str,
    pub message: &'a str,
    pub draft: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StickerUpdate<'a> {
    pub title: Option<&'a str>,
    pub background_color: Option<&'a str>,
    pub pattern_url: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub font: Option<&'a str>,
    pub font_color: Option<&'a str>,
    pub message: Option<&'a str>,
    pub draft: Option<bool>,
}

#[entrait(pub SelectStickers, mock_api=SelectStickersMock)]
async fn select_stickers(deps: &impl GetPgPool, filter: Filter) -> PeelResult<Vec<Sticker>> {
    let stickers = sqlx::query_as::<_, Sticker>(
        // language=PostgreSQL
        r#"
        SELECT
            s.sticker_id, s.title, s.background_color, s.pattern_url, s.image_url,
            s.font, s.font_color, s.message, s.draft, s.created_at, s.updated_at,
            s.creator_id, u.username AS creator_username
        FROM app.sticker s
        INNER JOIN app."user" u ON u.user_id = s.creator_id
        WHERE ($1::uuid IS NULL OR s.sticker_id = $1)
          AND ($2::uuid IS NULL OR s.creator_id = $2)
          AND ($3::uuid IS NULL OR EXISTS(
                SELECT 1 FROM app.follow
                WHERE following_user_id = $3 AND followed_user_id = s.creator_id
          ))
        ORDER BY s.created_at DESC, s.sticker_id
        "#,
    )
    .bind(filter.sticker_id)
    .bind(filter.creator_id)
    .bind(filter.followed_by)
    .fetch_all(deps.get_pg_pool())
    .await?;

    Ok(stickers)
}

#[entrait(pub InsertSticker, mock_api=InsertStickerMock)]
async fn insert_sticker(
    deps: &impl GetPgPool,
    UserId(creator_id): UserId,
    new: NewSticker<'_>,
) -> PeelResult<Sticker> {
    let sticker = sqlx::query_as::<_, Sticker>(
        // language=PostgreSQL
        r#"
        WITH inserted AS (
            INSERT INTO app.sticker (
                creator_id, title, background_color, pattern_url, image_url,
                font, font_color, message, draft
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                sticker_id, title, background_color, pattern_url, image_url,
                font, font_color, message, draft, created_at, updated_at, creator_id
        )
        SELECT inserted.*, u.username AS creator_username
        FROM inserted
        INNER JOIN app."user" u ON u.user_id = inserted.creator_id
        "#,
    )
    .bind(creator_id)
    .bind(new.title)
    .bind(new.background_color)
    .bind(new.pattern_url)
    .bind(new.image_url)
    .bind(new.font)
    .bind(new.font_color)
    .bind(new.message)
    .bind(new.draft)
    .fetch_one(deps.get_pg_pool())
    .await
    .on_constraint("sticker_title_key", |_| {
        PeelError::DuplicateStickerTitle(new.title.to_string())
    })?;

    Ok(sticker)
}

#[entrait(pub UpdateSticker, mock_api=UpdateStickerMock)]
async fn update_sticker(
    deps: &impl GetPgPool,
    sticker_id: Uuid,
    up: StickerUpdate<'_>,
) -> PeelResult<()> {
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
        UPDATE app.sticker SET
            title = COALESCE($1, title),
            background_color = COALESCE($2, background_color),
            pattern_url = COALESCE($3, pattern_url),
            image_url = COALESCE($4, image_url),
            font = COALESCE($5, font),
            font_color = COALESCE($6, font_color),
            message = COALESCE($7, message),
            draft = COALESCE($8, draft),
            updated_at = now()
        WHERE sticker_id = $9
        "#,
    )
    .bind(up.title)
    .bind(up.background_color)
    .bind(up.pattern_url)
    .bind(up.image_url)
    .bind(up.font)
    .bind(up.font_color)
    .bind(up.message)
    .bind(up.draft)
    .bind(sticker_id)
    .execute(deps.get_pg_pool())
    .await
    .on_constraint("sticker_title_key", |_| {
        PeelError::DuplicateStickerTitle(up.title.unwrap_or_default().to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(PeelError::StickerNotFound);
    }

    Ok(())
}

#[entrait(pub DeleteSticker, mock_api=DeleteStickerMock)]
async fn delete_sticker(deps: &impl GetPgPool, sticker_id: Uuid) -> PeelResult<()> {
    let result = sqlx::query(r#"DELETE FROM app.sticker WHERE sticker_id = $1"#)
        .bind(sticker_id)
        .execute(deps.get_pg_pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(PeelError::StickerNotFound);
    }

    Ok(())
}
