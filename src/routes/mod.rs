/// Router Module Index
///
/// Routes are grouped by who may reach them. Access control is attached per group
/// (via Axum layers) in `create_router`, so a handler cannot end up on a less
/// protected router by accident.

/// Routes open to anonymous requesters: the news feed, news details and the
/// identity entry points.
pub mod public;

/// Routes behind the `AuthUser` extractor middleware. Ownership of comments and
/// notes is checked inside the handlers.
pub mod authenticated;

/// Routes restricted to the 'admin' role.
pub mod admin;
