use uuid::Uuid;

use crate::{
    auth::{AuthUser, Requester},
    error::{AppError, AppResult},
    models::{Comment, Note, roles},
};

/// Anything with a single author that alone may mutate it.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

impl Owned for Note {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// authorize
///
/// `Allow` iff the requester is authenticated and is the entity's author.
/// Anonymous requesters and every other user are denied.
pub fn authorize<E: Owned>(requester: &Requester, entity: &E) -> Decision {
    match requester.user() {
        Some(user) if user.id == entity.owner_id() => Decision::Allow,
        _ => Decision::Deny,
    }
}

/// authorize_delete
///
/// Same as [`authorize`], except that administrators may delete anything.
pub fn authorize_delete<E: Owned>(requester: &Requester, entity: &E) -> Decision {
    match requester.user() {
        Some(user) if user.role == roles::ADMIN => Decision::Allow,
        _ => authorize(requester, entity),
    }
}

/// Maps a denial to `NotOwner`, which renders as 404 so the entity's existence is not
/// disclosed to non-owners.
pub fn ensure_owner<E: Owned>(user: &AuthUser, entity: &E) -> AppResult<()> {
    into_result(authorize(&Requester::User(user.clone()), entity))
}

pub fn ensure_may_delete<E: Owned>(user: &AuthUser, entity: &E) -> AppResult<()> {
    into_result(authorize_delete(&Requester::User(user.clone()), entity))
}

fn into_result(decision: Decision) -> AppResult<()> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(AppError::NotOwner),
    }
}
