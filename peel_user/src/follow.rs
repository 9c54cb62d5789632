use crate::auth::Authenticated;

use peel_core::error::{PeelError, PeelResult};
use peel_core::timestamp::Timestamptz;
use peel_core::UserId;
use peel_db::follow_db;

use entrait::entrait_export as entrait;
use uuid::Uuid;

/// A directed edge in the follow graph.
#[derive(serde::Serialize, serde::Deserialize, Clone)]
#[cfg_attr(test, derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct FollowEdge {
    pub following_user_id: Uuid,
    pub followed_user_id: Uuid,
    pub created_at: Timestamptz,
}

impl From<follow_db::FollowEdge> for FollowEdge {
    fn from(edge: follow_db::FollowEdge) -> Self {
        Self {
            following_user_id: edge.following_user_id,
            followed_user_id: edge.followed_user_id,
            created_at: edge.created_at,
        }
    }
}

/// The profile on the other end of a follow edge.
#[derive(serde::Serialize, serde::Deserialize, Clone)]
#[cfg_attr(test, derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct FollowPeer {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
}

impl From<follow_db::Peer> for FollowPeer {
    fn from(peer: follow_db::Peer) -> Self {
        Self {
            user_id: peer.user_id,
            username: peer.username,
            display_name: peer.display_name,
            avatar: peer.avatar,
        }
    }
}

#[entrait(pub FollowUser, mock_api=FollowUserMock)]
async fn follow_user(
    deps: &impl follow_db::InsertFollow,
    Authenticated(user_id): Authenticated<UserId>,
    followed_user_id: Uuid,
) -> PeelResult<FollowEdge> {
    // Rejected before the store is involved.
    if user_id.0 == followed_user_id {
        return Err(PeelError::SelfFollow);
    }

    deps.insert_follow(user_id, followed_user_id)
        .await
        .map(Into::into)
}

#[entrait(pub UnfollowUser, mock_api=UnfollowUserMock)]
async fn unfollow_user(
    deps: &impl follow_db::DeleteFollow,
    Authenticated(user_id): Authenticated<UserId>,
    followed_user_id: Uuid,
) -> PeelResult<()> {
    deps.delete_follow(user_id, followed_user_id).await
}

#[entrait(pub ListFollowing, mock_api=ListFollowingMock)]
async fn list_following(
    deps: &impl follow_db::SelectFollowing,
    Authenticated(user_id): Authenticated<UserId>,
) -> PeelResult<Vec<FollowPeer>> {
    deps.select_following(user_id)
        .await
        .map(|peers| peers.into_iter().map(Into::into).collect())
}

#[entrait(pub ListFollowers, mock_api=ListFollowersMock)]
async fn list_followers(
    deps: &impl follow_db::SelectFollowers,
    Authenticated(user_id): Authenticated<UserId>,
) -> PeelResult<Vec<FollowPeer>> {
    deps.select_followers(user_id)
        .await
        .map(|peers| peers.into_iter().map(Into::into).collect())
}
