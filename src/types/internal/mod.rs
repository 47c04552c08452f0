// Internal types - never serialized to clients directly
pub mod auth;
pub mod context;
pub mod pagination;

pub use context::{ContextResult, RequestContext, RequestContextMeta};
