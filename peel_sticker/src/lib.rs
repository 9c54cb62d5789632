use peel_core::access::{self, Intent};
use peel_core::error::{PeelError, PeelResult};
use peel_core::iter_util::Single;
use peel_core::timestamp::Timestamptz;
use peel_core::UserId;
use peel_db::sticker_db;
use peel_db::user_db;
use peel_user::auth::Authenticated;

use entrait::entrait_export as entrait;
use uuid::Uuid;

#[derive(serde::Deserialize, serde::Serialize, Clone)]
#[cfg_attr(test, derive(Debug))]
#[serde(rename_all = "camelCase")]
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

impl From<sticker_db::Sticker> for Sticker {
    fn from(s: sticker_db::Sticker) -> Self {
        Self {
            sticker_id: s.sticker_id,
            title: s.title,
            background_color: s.background_color,
            pattern_url: s.pattern_url,
            image_url: s.image_url,
            font: s.font,
            font_color: s.font_color,
            message: s.message,
            draft: s.draft,
            created_at: s.created_at,
            updated_at: s.updated_at,
            creator_id: s.creator_id,
            creator_username: s.creator_username,
        }
    }
}

/// Only the title is mandatory; the remaining attributes fall back to the
/// column defaults.
#[derive(serde::Deserialize, serde::Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StickerCreate {
    pub title: String,
    #[serde(default)]
    pub background_color: String,
    #[serde(default)]
    pub pattern_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub font: String,
    #[serde(default)]
    pub font_color: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub draft: bool,
}

#[derive(serde::Deserialize, Default, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StickerUpdate {
    pub title: Option<String>,
    pub background_color: Option<String>,
    pub pattern_url: Option<String>,
    pub image_url: Option<String>,
    pub font: Option<String>,
    pub font_color: Option<String>,
    pub message: Option<String>,
    pub draft: Option<bool>,
}

#[entrait(pub ListStickers, mock_api=ListStickersMock)]
async fn list_stickers(deps: &impl sticker_db::SelectStickers) -> PeelResult<Vec<Sticker>> {
    deps.select_stickers(sticker_db::Filter::default())
        .await
        .map(|stickers| stickers.into_iter().map(Into::into).collect())
}

#[entrait(pub ListStickersByUser, mock_api=ListStickersByUserMock)]
async fn list_stickers_by_user(
    deps: &(impl user_db::FindUserById + sticker_db::SelectStickers),
    user_id: Uuid,
) -> PeelResult<Vec<Sticker>> {
    // An unknown creator is a 404, not an empty list.
    deps.find_user_by_id(UserId(user_id))
        .await?
        .ok_or(PeelError::UserNotFound)?;

    deps.select_stickers(sticker_db::Filter {
        creator_id: Some(user_id),
        ..Default::default()
    })
    .await
    .map(|stickers| stickers.into_iter().map(Into::into).collect())
}

#[entrait(pub ListMyStickers, mock_api=ListMyStickersMock)]
async fn list_my_stickers(
    deps: &impl sticker_db::SelectStickers,
    Authenticated(user_id): Authenticated<UserId>,
) -> PeelResult<Vec<Sticker>> {
    deps.select_stickers(sticker_db::Filter {
        creator_id: Some(user_id.0),
        ..Default::default()
    })
    .await
    .map(|stickers| stickers.into_iter().map(Into::into).collect())
}

#[entrait(pub ListFeed, mock_api=ListFeedMock)]
async fn list_feed(
    deps: &impl sticker_db::SelectStickers,
    Authenticated(user_id): Authenticated<UserId>,
) -> PeelResult<Vec<Sticker>> {
    // Following nobody yields an empty feed, not an error.
    deps.select_stickers(sticker_db::Filter {
        followed_by: Some(user_id.0),
        ..Default::default()
    })
    .await
    .map(|stickers| stickers.into_iter().map(Into::into).collect())
}

#[entrait(pub FetchSticker, mock_api=FetchStickerMock)]
async fn fetch_sticker(
    deps: &impl sticker_db::SelectStickers,
    sticker_id: Uuid,
) -> PeelResult<Sticker> {
    let db_sticker = deps
        .select_stickers(sticker_db::Filter {
            sticker_id: Some(sticker_id),
            ..Default::default()
        })
        .await?
        .into_iter()
        .single_or_none()?
        .ok_or(PeelError::StickerNotFound)?;

    access::authorize(Intent::Read, &db_sticker, None)?;

    Ok(db_sticker.into())
}

#[entrait(pub CreateSticker, mock_api=CreateStickerMock)]
async fn create_sticker(
    deps: &impl sticker_db::InsertSticker,
    Authenticated(user_id): Authenticated<UserId>,
    sticker: StickerCreate,
) -> PeelResult<Sticker> {
    deps.insert_sticker(
        user_id,
        sticker_db::NewSticker {
            title: &sticker.title,
            background_color: &sticker.background_color,
            pattern_url: sticker.pattern_url.as_deref(),
            image_url: sticker.image_url.as_deref(),
            font: &sticker.font,
            font_color: &sticker.font_color,
            message: &sticker.message,
            draft: sticker.draft,
        },
    )
    .await
    .map(Into::into)
}

#[entrait(pub UpdateSticker, mock_api=UpdateStickerMock)]
async fn update_sticker(
    deps: &(impl sticker_db::SelectStickers + sticker_db::UpdateSticker),
    Authenticated(user_id): Authenticated<UserId>,
    sticker_id: Uuid,
    update: StickerUpdate,
) -> PeelResult<Sticker> {
    let db_sticker = deps
        .select_stickers(sticker_db::Filter {
            sticker_id: Some(sticker_id),
            ..Default::default()
        })
        .await?
        .into_iter()
        .single_or_none()?
        .ok_or(PeelError::StickerNotFound)?;

    access::authorize(Intent::Mutate, &db_sticker, Some(&user_id))?;

    deps.update_sticker(
        sticker_id,
        sticker_db::StickerUpdate {
            title: update.title.as_deref(),
            background_color: update.background_color.as_deref(),
            pattern_url: update.pattern_url.as_deref(),
            image_url: update.image_url.as_deref(),
            font: update.font.as_deref(),
            font_color: update.font_color.as_deref(),
            message: update.message.as_deref(),
            draft: update.draft,
        },
    )
    .await?;

    get_single_sticker(deps, sticker_id).await
}

#[entrait(pub DeleteSticker, mock_api=DeleteStickerMock)]
async fn delete_sticker(
    deps: &(impl sticker_db::SelectStickers + sticker_db::DeleteSticker),
    Authenticated(user_id): Authenticated<UserId>,
    sticker_id: Uuid,
) -> PeelResult<()> {
    let db_sticker = deps
        .select_stickers(sticker_db::Filter {
            sticker_id: Some(sticker_id),
            ..Default::default()
        })
        .await?
        .into_iter()
        .single_or_none()?
        .ok_or(PeelError::StickerNotFound)?;

    access::authorize(Intent::Mutate, &db_sticker, Some(&user_id))?;

    deps.delete_sticker(sticker_id).await
}

async fn get_single_sticker(
    deps: &impl sticker_db::SelectStickers,
    sticker_id: Uuid,
) -> PeelResult<Sticker> {
    deps.select_stickers(sticker_db::Filter {
        sticker_id: Some(sticker_id),
        ..Default::default()
    })
    .await?
    .into_iter()
    .single()
    .map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use peel_core::PasswordHash;
    use peel_db::sticker_db::{
        DeleteStickerMock, InsertStickerMock, SelectStickersMock, UpdateStickerMock,
    };
    use peel_db::user_db::FindUserByIdMock;

    use assert_matches::*;
    use unimock::*;

    fn test_user_id() -> Uuid {
        Uuid::parse_str("20a626ba-c7d3-44c7-981a-e880f81c126f").unwrap()
    }

    fn other_user_id() -> Uuid {
        Uuid::parse_str("3d9bd39e-a7a4-4b1f-abc2-0af08d1afd54").unwrap()
    }

    fn test_sticker_id() -> Uuid {
        Uuid::parse_str("f8e14543-3b8e-4a1c-9be6-01e0d6a28d0a").unwrap()
    }

    fn test_timestamp() -> Timestamptz {
        Timestamptz(
            time::OffsetDateTime::parse(
                "2019-10-12T07:20:50.52Z",
                &time::format_description::well_known::Rfc3339,
            )
            .unwrap(),
        )
    }

    fn test_db_sticker() -> sticker_db::Sticker {
        sticker_db::Sticker {
            sticker_id: test_sticker_id(),
            title: "title".to_string(),
            background_color: "#ffcc00".to_string(),
            pattern_url: None,
            image_url: Some("https://img.example/sticker.png".to_string()),
            font: "sans".to_string(),
            font_color: "#222222".to_string(),
            message: "hello".to_string(),
            draft: false,
            created_at: test_timestamp(),
            updated_at: test_timestamp(),
            creator_id: test_user_id(),
            creator_username: "creator".to_string(),
        }
    }

    fn test_db_user() -> user_db::User {
        user_db::User {
            user_id: test_user_id(),
            username: "creator".to_string(),
            display_name: "".to_string(),
            bio: "".to_string(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn fetching_a_missing_sticker_should_produce_not_found() {
        let deps = Unimock::new(
            SelectStickersMock::select_stickers
                .next_call(matching!(sticker_db::Filter {
                    sticker_id: Some(_),
                    ..
                }))
                .returns(Ok(vec![])),
        );

        assert_matches!(
            fetch_sticker(&deps, test_sticker_id()).await,
            Err(PeelError::StickerNotFound)
        );
    }

    #[tokio::test]
    async fn create_should_attribute_the_acting_user() {
        let deps = Unimock::new(
            InsertStickerMock::insert_sticker
                .next_call(matching!(
                    (UserId(id), new) if id == &test_user_id() && new.title == "title"
                ))
                .returns(Ok(test_db_sticker())),
        );

        let sticker = create_sticker(
            &deps,
            Authenticated(UserId(test_user_id())),
            StickerCreate {
                title: "title".to_string(),
                background_color: "#ffcc00".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(test_user_id(), sticker.creator_id);
        assert_eq!("creator", sticker.creator_username);
    }

    #[tokio::test]
    async fn listing_by_unknown_user_should_produce_not_found() {
        let deps = Unimock::new(
            FindUserByIdMock::find_user_by_id
                .next_call(matching!(_))
                .returns(Ok(None)),
        );

        assert_matches!(
            list_stickers_by_user(&deps, other_user_id()).await,
            Err(PeelError::UserNotFound)
        );
    }

    #[tokio::test]
    async fn listing_by_user_should_filter_on_that_creator() {
        let deps = Unimock::new((
            FindUserByIdMock::find_user_by_id
                .next_call(matching!(_))
                .returns(Ok(Some((test_db_user(), PasswordHash("h4sh".to_string()))))),
            SelectStickersMock::select_stickers
                .next_call(matching!(
                    (filter) if filter == &sticker_db::Filter {
                        creator_id: Some(test_user_id()),
                        ..Default::default()
                    }
                ))
                .returns(Ok(vec![test_db_sticker()])),
        ));

        let stickers = list_stickers_by_user(&deps, test_user_id()).await.unwrap();

        assert_eq!(1, stickers.len());
    }

    #[tokio::test]
    async fn my_stickers_should_filter_on_the_acting_user() {
        let deps = Unimock::new(
            SelectStickersMock::select_stickers
                .next_call(matching!(
                    (filter) if filter == &sticker_db::Filter {
                        creator_id: Some(test_user_id()),
                        ..Default::default()
                    }
                ))
                .returns(Ok(vec![test_db_sticker()])),
        );

        let stickers = list_my_stickers(&deps, Authenticated(UserId(test_user_id())))
            .await
            .unwrap();

        assert_eq!(1, stickers.len());
    }

    #[tokio::test]
    async fn the_feed_should_only_ask_for_followed_creators() {
        let deps = Unimock::new(
            SelectStickersMock::select_stickers
                .next_call(matching!(
                    (filter) if filter == &sticker_db::Filter {
                        followed_by: Some(test_user_id()),
                        ..Default::default()
                    }
                ))
                .returns(Ok(vec![])),
        );

        let stickers = list_feed(&deps, Authenticated(UserId(test_user_id())))
            .await
            .unwrap();

        assert!(stickers.is_empty());
    }

    #[tokio::test]
    async fn updating_anothers_sticker_should_be_forbidden() {
        // No update clause: the store must not be mutated.
        let deps = Unimock::new(
            SelectStickersMock::select_stickers
                .next_call(matching!(_))
                .returns(Ok(vec![test_db_sticker()])),
        );

        assert_matches!(
            update_sticker(
                &deps,
                Authenticated(UserId(other_user_id())),
                test_sticker_id(),
                StickerUpdate::default(),
            )
            .await,
            Err(PeelError::Forbidden)
        );
    }

    #[tokio::test]
    async fn the_creator_should_get_the_fresh_row_back_after_update() {
        let deps = Unimock::new((
            SelectStickersMock::select_stickers
                .next_call(matching!(sticker_db::Filter {
                    sticker_id: Some(_),
                    ..
                }))
                .returns(Ok(vec![test_db_sticker()])),
            UpdateStickerMock::update_sticker
                .next_call(matching!(
                    (sticker_id, up) if sticker_id == &test_sticker_id() && up.title == Some("New")
                ))
                .returns(Ok(())),
            SelectStickersMock::select_stickers
                .next_call(matching!(sticker_db::Filter {
                    sticker_id: Some(_),
                    ..
                }))
                .returns(Ok(vec![sticker_db::Sticker {
                    title: "New".to_string(),
                    ..test_db_sticker()
                }])),
        ));

        let sticker = update_sticker(
            &deps,
            Authenticated(UserId(test_user_id())),
            test_sticker_id(),
            StickerUpdate {
                title: Some("New".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!("New", sticker.title);
    }

    #[tokio::test]
    async fn deleting_anothers_sticker_should_be_forbidden() {
        let deps = Unimock::new(
            SelectStickersMock::select_stickers
                .next_call(matching!(_))
                .returns(Ok(vec![test_db_sticker()])),
        );

        assert_matches!(
            delete_sticker(
                &deps,
                Authenticated(UserId(other_user_id())),
                test_sticker_id(),
            )
            .await,
            Err(PeelError::Forbidden)
        );
    }

    #[tokio::test]
    async fn the_creator_should_be_able_to_delete() {
        let deps = Unimock::new((
            SelectStickersMock::select_stickers
                .next_call(matching!(_))
                .returns(Ok(vec![test_db_sticker()])),
            DeleteStickerMock::delete_sticker
                .next_call(matching!((id) if id == &test_sticker_id()))
                .returns(Ok(())),
        ));

        delete_sticker(
            &deps,
            Authenticated(UserId(test_user_id())),
            test_sticker_id(),
        )
        .await
        .unwrap();
    }
}
