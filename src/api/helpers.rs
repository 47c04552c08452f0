use poem::Request;
use poem_openapi::types::multipart::Upload;

use crate::app_data::AppData;
use crate::coordinators::MediaFile;
use crate::errors::{ApiError, InternalError};
use crate::types::internal::auth::Role;
use crate::types::internal::context::{RequestContext, RequestContextMeta};

/// Convert an internal error using the configured error mode
pub(crate) fn api_error(app_data: &AppData, err: InternalError) -> ApiError {
    ApiError::from_internal_error(err, app_data.settings.error_mode())
}

/// Context for endpoints that need no identity
pub(crate) fn anonymous_context(req: &Request) -> RequestContext {
    RequestContext::anonymous(&RequestContextMeta::from_request(req))
}

/// Resolve the bearer token on `req` into an authenticated context
pub(crate) async fn authenticate(app_data: &AppData, req: &Request) -> Result<RequestContext, ApiError> {
    let meta = RequestContextMeta::from_request(req);
    app_data
        .access_control
        .authenticate(&meta)
        .await
        .and_then(|result| result.into_result())
        .map_err(|e| api_error(app_data, e))
}

/// Authenticate, then require one of `roles`
pub(crate) async fn authorize(
    app_data: &AppData,
    req: &Request,
    roles: &[Role],
) -> Result<RequestContext, ApiError> {
    let ctx = authenticate(app_data, req).await?;
    app_data
        .access_control
        .authorize(&ctx, roles)
        .map_err(|e| api_error(app_data, e))?;
    Ok(ctx)
}

/// Read an uploaded part into memory
pub(crate) async fn read_upload(app_data: &AppData, upload: Upload) -> Result<MediaFile, ApiError> {
    let content_type = upload.content_type().map(str::to_string);
    let bytes = upload
        .into_vec()
        .await
        .map_err(|e| api_error(app_data, InternalError::BlobStore(e.into())))?;
    Ok(MediaFile { bytes, content_type })
}
