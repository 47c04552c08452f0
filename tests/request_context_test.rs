use explorer_backend::types::internal::context::{RequestContext, RequestContextMeta, RequestSource};

#[test]
fn test_request_context_anonymous_defaults_to_api_source() {
    let ctx = RequestContext::anonymous(&RequestContextMeta::anonymous());

    assert_eq!(ctx.source, RequestSource::API);
    assert_eq!(ctx.actor_id, "anonymous");
    assert!(!ctx.is_authenticated());
    assert!(ctx.user_id().is_none());
    assert!(ctx.claims.is_none());
}

#[test]
fn test_request_context_for_cli() {
    let ctx = RequestContext::for_cli("grant_admin");

    assert_eq!(ctx.source, RequestSource::CLI);
    assert_eq!(ctx.actor_id, "cli:grant_admin");
    assert!(!ctx.is_authenticated());
}

#[test]
fn test_request_context_for_system() {
    let ctx = RequestContext::for_system("blob_cleanup");

    assert_eq!(ctx.source, RequestSource::System);
    assert_eq!(ctx.actor_id, "system:blob_cleanup");
    assert!(ctx.ip_address.is_none());
}

#[test]
fn test_bearer_meta_is_not_authenticated_by_itself() {
    let meta = RequestContextMeta::with_bearer("abc");
    let ctx = RequestContext::anonymous(&meta);

    assert!(!ctx.is_authenticated());
    assert!(!ctx.has_role(&[]));
}
