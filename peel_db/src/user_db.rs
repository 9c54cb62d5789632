use crate::DbResultExt;
use crate::GetPgPool;
use peel_core::access::OwnedResource;
use peel_core::error::{PeelError, PeelResult};
use peel_core::{PasswordHash, UserId};

use entrait::entrait_export as entrait;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub avatar: Option<String>,
}

impl OwnedResource for User {
    fn owner_id(&self) -> UserId {
        UserId(self.user_id)
    }
}

#[derive(Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password_hash: Option<PasswordHash>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    password_hash: String,
    display_name: String,
    bio: String,
    avatar: Option<String>,
}

impl UserRow {
    fn into_user_and_hash(self) -> (User, PasswordHash) {
        (
            User {
                user_id: self.user_id,
                username: self.username,
                display_name: self.display_name,
                bio: self.bio,
                avatar: self.avatar,
            },
            PasswordHash(self.password_hash),
        )
    }
}

#[entrait(pub InsertUser, mock_api=InsertUserMock)]
async fn insert_user(
    deps: &impl GetPgPool,
    username: String,
    password_hash: PasswordHash,
) -> PeelResult<User> {
    let user_id = sqlx::query_scalar::<_, Uuid>(
        r#"INSERT INTO app."user" (username, password_hash) VALUES ($1, $2) RETURNING user_id"#,
    )
    .bind(&username)
    .bind(&password_hash.0)
    .fetch_one(deps.get_pg_pool())
    .await
    .on_constraint("user_username_key", |_| PeelError::UsernameTaken)?;

    Ok(User {
        user_id,
        username,
        display_name: "".to_string(),
        bio: "".to_string(),
        avatar: None,
    })
}

#[entrait(pub FindUserById, mock_api=FindUserByIdMock)]
async fn find_user_by_id(
    deps: &impl GetPgPool,
    UserId(user_id): UserId,
) -> PeelResult<Option<(User, PasswordHash)>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, username, password_hash, display_name, bio, avatar
        FROM app."user"
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(deps.get_pg_pool())
    .await?;

    Ok(row.map(UserRow::into_user_and_hash))
}

#[entrait(pub FindUserByUsername, mock_api=FindUserByUsernameMock)]
async fn find_user_by_username(
    deps: &impl GetPgPool,
    username: String,
) -> PeelResult<Option<(User, PasswordHash)>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, username, password_hash, display_name, bio, avatar
        FROM app."user"
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(deps.get_pg_pool())
    .await?;

    Ok(row.map(UserRow::into_user_and_hash))
}

#[entrait(pub SelectUsers, mock_api=SelectUsersMock)]
async fn select_users(deps: &impl GetPgPool) -> PeelResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, display_name, bio, avatar
        FROM app."user"
        ORDER BY username
        "#,
    )
    .fetch_all(deps.get_pg_pool())
    .await?;

    Ok(users)
}

#[entrait(pub UpdateUser, mock_api=UpdateUserMock)]
async fn update_user(
    deps: &impl GetPgPool,
    UserId(user_id): UserId,
    update: UserUpdate,
) -> PeelResult<User> {
    let user = sqlx::query_as::<_, User>(
        // language=PostgreSQL
        r#"
        UPDATE app."user" SET
            username = COALESCE($1, username),
            password_hash = COALESCE($2, password_hash),
            display_name = COALESCE($3, display_name),
            bio = COALESCE($4, bio),
            avatar = COALESCE($5, avatar),
            updated_at = now()
        WHERE user_id = $6
        RETURNING user_id, username, display_name, bio, avatar
        "#,
    )
    .bind(update.username)
    .bind(update.password_hash.map(|hash| hash.0))
    .bind(update.display_name)
    .bind(update.bio)
    .bind(update.avatar)
    .bind(user_id)
    .fetch_one(deps.get_pg_pool())
    .await
    .on_constraint("user_username_key", |_| PeelError::UsernameTaken)?;

    Ok(user)
}

#[entrait(pub DeleteUser, mock_api=DeleteUserMock)]
async fn delete_user(deps: &impl GetPgPool, UserId(user_id): UserId) -> PeelResult<()> {
    let result = sqlx::query(r#"DELETE FROM app."user" WHERE user_id = $1"#)
        .bind(user_id)
        .execute(deps.get_pg_pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(PeelError::UserNotFound);
    }

    Ok(())
}
