// Coordinators layer - Workflow orchestration
//
// Coordinators compose store and provider operations for specific API
// endpoints. Multi-row writes open a transaction here and hand its handle to
// every store call.

pub mod auth_coordinator;
pub mod catalog_coordinator;
pub mod comment_coordinator;
pub mod review_coordinator;
pub mod user_coordinator;

pub use auth_coordinator::{AuthCoordinator, Session};
pub use catalog_coordinator::CatalogCoordinator;
pub use comment_coordinator::CommentCoordinator;
pub use review_coordinator::{MAX_MEDIA_PER_UPLOAD, MediaFile, ReviewCoordinator, ensure_media_count};
pub use user_coordinator::{ProfileChanges, UserCoordinator};

use crate::errors::InternalError;
use crate::errors::internal::AccessError;
use crate::types::internal::context::RequestContext;

/// Id of the user access control resolved for this request
pub(crate) fn require_user_id(ctx: &RequestContext) -> Result<&str, InternalError> {
    ctx.user_id().ok_or_else(|| AccessError::NoToken.into())
}

/// Accept only `image/*` uploads
pub(crate) fn ensure_image(content_type: Option<&str>) -> Result<(), InternalError> {
    match content_type {
        Some(ct) if ct.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
        _ => Err(InternalError::validation("Not an image! Please upload only images")),
    }
}
