use crate::errors::{InternalError, internal::AccessError};

use super::request_context::RequestContext;

/// Terminal state of access control for one request
#[derive(Debug)]
pub enum ContextResult {
    /// Token verified and the user resolved
    Authenticated(RequestContext),
    /// Request must not proceed
    Rejected(AccessError),
}

impl ContextResult {
    /// Convert to a Result so endpoints can use `?`
    pub fn into_result(self) -> Result<RequestContext, InternalError> {
        match self {
            ContextResult::Authenticated(ctx) => Ok(ctx),
            ContextResult::Rejected(reason) => Err(InternalError::Access(reason)),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, ContextResult::Authenticated(_))
    }

    pub fn rejection(&self) -> Option<AccessError> {
        match self {
            ContextResult::Authenticated(_) => None,
            ContextResult::Rejected(reason) => Some(*reason),
        }
    }
}
