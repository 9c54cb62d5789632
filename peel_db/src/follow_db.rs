use crate::DbResultExt;
use crate::GetPgPool;
use peel_core::error::{PeelError, PeelResult};
use peel_core::timestamp::Timestamptz;
use peel_core::UserId;

use entrait::entrait_export as entrait;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, sqlx::FromRow)]
pub struct FollowEdge {
    pub following_user_id: Uuid,
    pub followed_user_id: Uuid,
    pub created_at: Timestamptz,
}

/// The user on the other end of a follow edge.
#[derive(Clone, Debug, Eq, PartialEq, sqlx::FromRow)]
pub struct Peer {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
}

#[entrait(pub InsertFollow, mock_api=InsertFollowMock)]
async fn insert_follow(
    deps: &impl GetPgPool,
    UserId(following_user_id): UserId,
    followed_user_id: Uuid,
) -> PeelResult<FollowEdge> {
    let edge = sqlx::query_as::<_, FollowEdge>(
        r#"
        INSERT INTO app.follow (following_user_id, followed_user_id)
        VALUES ($1, $2)
        RETURNING following_user_id, followed_user_id, created_at
        "#,
    )
    .bind(following_user_id)
    .bind(followed_user_id)
    .fetch_one(deps.get_pg_pool())
    .await
    .on_constraint("follow_pkey", |_| PeelError::AlreadyFollowing)
    .on_constraint("follow_followed_user_id_fkey", |_| PeelError::UserNotFound)?;

    Ok(edge)
}

#[entrait(pub DeleteFollow, mock_api=DeleteFollowMock)]
async fn delete_follow(
    deps: &impl GetPgPool,
    UserId(following_user_id): UserId,
    followed_user_id: Uuid,
) -> PeelResult<()> {
    // Scoped to the acting follower: one user can never detach another
    // user's follow edge.
    let result = sqlx::query(
        r#"DELETE FROM app.follow WHERE following_user_id = $1 AND followed_user_id = $2"#,
    )
    .bind(following_user_id)
    .bind(followed_user_id)
    .execute(deps.get_pg_pool())
    .await?;

    if result.rows_affected() == 0 {
        return Err(PeelError::FollowNotFound);
    }

    Ok(())
}

#[entrait(pub SelectFollowing, mock_api=SelectFollowingMock)]
async fn select_following(deps: &impl GetPgPool, UserId(user_id): UserId) -> PeelResult<Vec<Peer>> {
    let peers = sqlx::query_as::<_, Peer>(
        r#"
        SELECT u.user_id, u.username, u.display_name, u.avatar
        FROM app.follow f
        INNER JOIN app."user" u ON u.user_id = f.followed_user_id
        WHERE f.following_user_id = $1
        ORDER BY f.created_at, u.user_id
        "#,
    )
    .bind(user_id)
    .fetch_all(deps.get_pg_pool())
    .await?;

    Ok(peers)
}

#[entrait(pub SelectFollowers, mock_api=SelectFollowersMock)]
async fn select_followers(deps: &impl GetPgPool, UserId(user_id): UserId) -> PeelResult<Vec<Peer>> {
    let peers = sqlx::query_as::<_, Peer>(
        r#"
        SELECT u.user_id, u.username, u.display_name, u.avatar
        FROM app.follow f
        INNER JOIN app."user" u ON u.user_id = f.following_user_id
        WHERE f.followed_user_id = $1
        ORDER BY f.created_at, u.user_id
        "#,
    )
    .bind(user_id)
    .fetch_all(deps.get_pg_pool())
    .await?;

    Ok(peers)
}

#[entrait(pub CountFollowing, mock_api=CountFollowingMock)]
async fn count_following(deps: &impl GetPgPool, UserId(user_id): UserId) -> PeelResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM app.follow WHERE following_user_id = $1"#,
    )
    .bind(user_id)
    .fetch_one(deps.get_pg_pool())
    .await?;

    Ok(count)
}

#[entrait(pub CountFollowers, mock_api=CountFollowersMock)]
async fn count_followers(deps: &impl GetPgPool, UserId(user_id): UserId) -> PeelResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM app.follow WHERE followed_user_id = $1"#,
    )
    .bind(user_id)
    .fetch_one(deps.get_pg_pool())
    .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_test_db;
    use crate::user_db::tests::{insert_test_user, other_user, TestNewUser};
    use crate::user_db::DeleteUser;

    use assert_matches::*;

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn should_follow_then_list_both_directions() {
        let db = create_test_db().await;
        let a = insert_test_user(&db, TestNewUser::default()).await.unwrap();
        let b = insert_test_user(&db, other_user()).await.unwrap();

        let edge = db.insert_follow(UserId(a.user_id), b.user_id).await.unwrap();
        assert_eq!(a.user_id, edge.following_user_id);
        assert_eq!(b.user_id, edge.followed_user_id);

        let following = db.select_following(UserId(a.user_id)).await.unwrap();
        assert_eq!(1, following.len());
        assert_eq!(b.user_id, following[0].user_id);
        assert_eq!("username2", following[0].username);

        let followers = db.select_followers(UserId(b.user_id)).await.unwrap();
        assert_eq!(1, followers.len());
        assert_eq!(a.user_id, followers[0].user_id);

        // The edge is directed: b follows nobody.
        let b_following = db.select_following(UserId(b.user_id)).await.unwrap();
        assert_eq!(0, b_following.len());
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn duplicate_follow_should_conflict_and_store_a_single_edge() {
        let db = create_test_db().await;
        let a = insert_test_user(&db, TestNewUser::default()).await.unwrap();
        let b = insert_test_user(&db, other_user()).await.unwrap();

        db.insert_follow(UserId(a.user_id), b.user_id).await.unwrap();
        let error = db
            .insert_follow(UserId(a.user_id), b.user_id)
            .await
            .expect_err("should error");

        assert_matches!(error, PeelError::AlreadyFollowing);
        assert_eq!(1, db.count_following(UserId(a.user_id)).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn following_an_unknown_user_should_be_not_found() {
        let db = create_test_db().await;
        let a = insert_test_user(&db, TestNewUser::default()).await.unwrap();

        let error = db
            .insert_follow(UserId(a.user_id), uuid::Uuid::new_v4())
            .await
            .expect_err("should error");

        assert_matches!(error, PeelError::UserNotFound);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn should_unfollow_exactly_once() {
        let db = create_test_db().await;
        let a = insert_test_user(&db, TestNewUser::default()).await.unwrap();
        let b = insert_test_user(&db, other_user()).await.unwrap();

        db.insert_follow(UserId(a.user_id), b.user_id).await.unwrap();
        db.delete_follow(UserId(a.user_id), b.user_id).await.unwrap();

        assert_eq!(0, db.count_following(UserId(a.user_id)).await.unwrap());
        assert_matches!(
            db.delete_follow(UserId(a.user_id), b.user_id).await,
            Err(PeelError::FollowNotFound)
        );
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn unfollow_should_be_scoped_to_the_acting_follower() {
        let db = create_test_db().await;
        let a = insert_test_user(&db, TestNewUser::default()).await.unwrap();
        let b = insert_test_user(&db, other_user()).await.unwrap();
        let c = insert_test_user(
            &db,
            TestNewUser {
                username: "username3",
                password_hash: "hash3",
            },
        )
        .await
        .unwrap();

        db.insert_follow(UserId(b.user_id), c.user_id).await.unwrap();

        // a never followed c, so a's unfollow must not touch b's edge.
        assert_matches!(
            db.delete_follow(UserId(a.user_id), c.user_id).await,
            Err(PeelError::FollowNotFound)
        );
        assert_eq!(1, db.count_followers(UserId(c.user_id)).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn count_should_equal_list_length() {
        let db = create_test_db().await;
        let a = insert_test_user(&db, TestNewUser::default()).await.unwrap();
        let b = insert_test_user(&db, other_user()).await.unwrap();
        let c = insert_test_user(
            &db,
            TestNewUser {
                username: "username3",
                password_hash: "hash3",
            },
        )
        .await
        .unwrap();

        db.insert_follow(UserId(a.user_id), b.user_id).await.unwrap();
        db.insert_follow(UserId(a.user_id), c.user_id).await.unwrap();

        let following = db.select_following(UserId(a.user_id)).await.unwrap();
        let count = db.count_following(UserId(a.user_id)).await.unwrap();
        assert_eq!(following.len() as i64, count);
        assert_eq!(2, count);

        // Oldest follow first.
        assert_eq!(b.user_id, following[0].user_id);
        assert_eq!(c.user_id, following[1].user_id);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (DATABASE_URL)"]
    async fn deleting_a_user_should_cascade_to_their_edges() {
        let db = create_test_db().await;
        let a = insert_test_user(&db, TestNewUser::default()).await.unwrap();
        let b = insert_test_user(&db, other_user()).await.unwrap();

        db.insert_follow(UserId(a.user_id), b.user_id).await.unwrap();
        db.delete_user(UserId(b.user_id)).await.unwrap();

        assert_eq!(0, db.count_following(UserId(a.user_id)).await.unwrap());
    }
}
