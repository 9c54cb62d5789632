use crate::error::{PeelError, PeelResult};
use crate::UserId;

/// What a request intends to do with a resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Intent {
    Read,
    Mutate,
}

/// A resource owned by exactly one user.
pub trait OwnedResource {
    fn owner_id(&self) -> UserId;
}

/// Object-level authorization. Reads always pass, authenticated or not;
/// mutations pass only for the resource's owner. Failure is `Forbidden`, not
/// `NotFound`: callers resolve the resource before authorizing, so a failed
/// check reveals that it exists.
pub fn authorize(
    intent: Intent,
    resource: &impl OwnedResource,
    acting_user_id: Option<&UserId>,
) -> PeelResult<()> {
    match intent {
        Intent::Read => Ok(()),
        Intent::Mutate => {
            if acting_user_id == Some(&resource.owner_id()) {
                Ok(())
            } else {
                Err(PeelError::Forbidden)
            }
        }
    }
}
