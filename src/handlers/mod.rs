//! HTTP handlers, grouped by the resource they serve.
//!
//! Handlers resolve identity through the `AuthUser` / `Requester` extractors, load
//! the target entity, run the `policy` checks and only then touch the repository.
//! Every failure is an `AppError`, so a denied or rejected request never writes.

pub mod admin;
pub mod comments;
pub mod identity;
pub mod news;
pub mod notes;

use axum::{Json, extract::rejection::JsonRejection};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// A JSON form submission whose rejection is deferred to the handler.
pub type FormBody<T> = Result<Json<T>, JsonRejection>;

/// read_form
///
/// Unwraps a submitted form. A body that is not valid JSON for `T` becomes a 400
/// on the `body` field. Owner routes call this after the ownership check, so a
/// non-owner gets 404 whatever the body.
pub fn read_form<T>(body: FormBody<T>) -> AppResult<T> {
    body.map(|Json(form)| form).map_err(|rejection| {
        tracing::debug!(%rejection, "form body rejected");
        AppError::validation("body", rejection.body_text())
    })
}

/// ServiceInfo
///
/// Landing payload for `GET /`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// home
///
/// [Public Route] Landing page.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service landing", body = ServiceInfo))
)]
pub async fn home() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
