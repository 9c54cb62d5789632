pub mod auth;
pub mod follow;
pub mod password;

use auth::Authenticated;

use peel_core::access::{self, Intent};
use peel_core::error::{PeelError, PeelResult};
use peel_core::UserId;
use peel_db::follow_db;
use peel_db::user_db;

use entrait::entrait_export as entrait;
use uuid::Uuid;

#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignedUser {
    pub user_id: Uuid,
    pub token: String,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub avatar: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct LoginUser {
    pub username: String,
    pub password: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

#[derive(serde::Deserialize, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

/// Public view of a user row.
#[derive(serde::Serialize, serde::Deserialize, Clone)]
#[cfg_attr(test, derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub avatar: Option<String>,
}

impl From<user_db::User> for User {
    fn from(u: user_db::User) -> Self {
        Self {
            user_id: u.user_id,
            username: u.username,
            display_name: u.display_name,
            bio: u.bio,
            avatar: u.avatar,
        }
    }
}

/// Public profile, enriched with follow-graph counts.
#[derive(serde::Serialize, serde::Deserialize, Clone)]
#[cfg_attr(test, derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub following_count: i64,
    pub followers_count: i64,
}

#[entrait(pub CreateUser, mock_api=CreateUserMock)]
async fn create_user(
    deps: &(impl password::HashPassword + user_db::InsertUser + auth::SignUserId),
    new_user: NewUser,
) -> PeelResult<SignedUser> {
    let password_hash = deps.hash_password(new_user.password).await?;

    let db_user = deps.insert_user(new_user.username, password_hash).await?;

    Ok(sign_db_user(deps, db_user))
}

#[entrait(pub Login, mock_api=LoginMock)]
async fn login(
    deps: &(impl user_db::FindUserByUsername + password::VerifyPassword + auth::SignUserId),
    login_user: LoginUser,
) -> PeelResult<SignedUser> {
    let (db_user, password_hash) = deps
        .find_user_by_username(login_user.username)
        .await?
        .ok_or(PeelError::UsernameDoesNotExist)?;

    deps.verify_password(login_user.password, password_hash)
        .await?;

    Ok(sign_db_user(deps, db_user))
}

#[entrait(pub FetchCurrentUser, mock_api=FetchCurrentUserMock)]
async fn fetch_current_user(
    deps: &(impl user_db::FindUserById + auth::SignUserId),
    Authenticated(user_id): Authenticated<UserId>,
) -> PeelResult<SignedUser> {
    let (db_user, _) = deps
        .find_user_by_id(user_id)
        .await?
        .ok_or(PeelError::CurrentUserDoesNotExist)?;

    Ok(sign_db_user(deps, db_user))
}

#[entrait(pub ListUsers, mock_api=ListUsersMock)]
async fn list_users(deps: &impl user_db::SelectUsers) -> PeelResult<Vec<User>> {
    deps.select_users()
        .await
        .map(|users| users.into_iter().map(Into::into).collect())
}

#[entrait(pub FetchProfile, mock_api=FetchProfileMock)]
async fn fetch_profile(
    deps: &(impl user_db::FindUserById + follow_db::CountFollowing + follow_db::CountFollowers),
    user_id: Uuid,
) -> PeelResult<Profile> {
    let (db_user, _) = deps
        .find_user_by_id(UserId(user_id))
        .await?
        .ok_or(PeelError::UserNotFound)?;

    access::authorize(Intent::Read, &db_user, None)?;

    profile_with_counts(deps, db_user).await
}

#[entrait(pub UpdateProfile, mock_api=UpdateProfileMock)]
async fn update_profile(
    deps: &(impl user_db::FindUserById
          + user_db::UpdateUser
          + password::HashPassword
          + follow_db::CountFollowing
          + follow_db::CountFollowers),
    Authenticated(acting_user_id): Authenticated<UserId>,
    user_id: Uuid,
    update: ProfileUpdate,
) -> PeelResult<Profile> {
    let (db_user, _) = deps
        .find_user_by_id(UserId(user_id))
        .await?
        .ok_or(PeelError::UserNotFound)?;

    access::authorize(Intent::Mutate, &db_user, Some(&acting_user_id))?;

    let password_hash = if let Some(password) = &update.password {
        Some(deps.hash_password(password.clone()).await?)
    } else {
        None
    };

    let db_user = deps
        .update_user(
            UserId(user_id),
            user_db::UserUpdate {
                username: update.username,
                password_hash,
                display_name: update.display_name,
                bio: update.bio,
                avatar: update.avatar,
            },
        )
        .await?;

    profile_with_counts(deps, db_user).await
}

#[entrait(pub DeleteProfile, mock_api=DeleteProfileMock)]
async fn delete_profile(
    deps: &(impl user_db::FindUserById + user_db::DeleteUser),
    Authenticated(acting_user_id): Authenticated<UserId>,
    user_id: Uuid,
) -> PeelResult<()> {
    let (db_user, _) = deps
        .find_user_by_id(UserId(user_id))
        .await?
        .ok_or(PeelError::UserNotFound)?;

    access::authorize(Intent::Mutate, &db_user, Some(&acting_user_id))?;

    // Cascades to the user's stickers and follow edges.
    deps.delete_user(UserId(user_id)).await
}

fn sign_db_user(deps: &impl auth::SignUserId, db_user: user_db::User) -> SignedUser {
    SignedUser {
        token: deps.sign_user_id(UserId(db_user.user_id)),
        user_id: db_user.user_id,
        username: db_user.username,
        display_name: db_user.display_name,
        bio: db_user.bio,
        avatar: db_user.avatar,
    }
}

// Counts are computed on demand, never cached.
async fn profile_with_counts(
    deps: &(impl follow_db::CountFollowing + follow_db::CountFollowers),
    db_user: user_db::User,
) -> PeelResult<Profile> {
    let following_count = deps.count_following(UserId(db_user.user_id)).await?;
    let followers_count = deps.count_followers(UserId(db_user.user_id)).await?;

    Ok(Profile {
        user_id: db_user.user_id,
        username: db_user.username,
        display_name: db_user.display_name,
        bio: db_user.bio,
        avatar: db_user.avatar,
        following_count,
        followers_count,
    })
}
