use std::sync::Arc;

use poem::Request;
use poem_openapi::{ApiResponse, OpenApi, Tags, param::Path, payload::Json};

use crate::api::helpers::{anonymous_context, api_error, authenticate, read_upload};
use crate::app_data::AppData;
use crate::coordinators::{AuthCoordinator, ProfileChanges, Session, UserCoordinator};
use crate::errors::ApiError;
use crate::stores::NewUser;
use crate::types::dto::auth::{
    AuthData, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
    UpdatePasswordRequest,
};
use crate::types::dto::common::{Envelope, MessageResponse, NoContentResponse};
use crate::types::dto::user::{AvatarUpload, UpdateMeRequest, UserData};

/// Account, session and password endpoints
pub struct UserApi {
    app_data: Arc<AppData>,
    auth_coordinator: AuthCoordinator,
    user_coordinator: UserCoordinator,
}

impl UserApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            auth_coordinator: AuthCoordinator::new(app_data.clone()),
            user_coordinator: UserCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum UserTags {
    /// Signup, login and password flows
    Authentication,
    /// The signed-in user's own account
    Users,
}

#[derive(ApiResponse)]
enum SignupResponse {
    #[oai(status = 201)]
    Created(Json<Envelope<AuthData>>),
}

fn session_envelope(message: &str, session: Session) -> Json<Envelope<AuthData>> {
    Json(Envelope::success(
        message,
        AuthData {
            token: session.token,
            user: session.user.into(),
        },
    ))
}

#[OpenApi(prefix_path = "/users")]
impl UserApi {
    /// Create an account and receive a session token
    #[oai(path = "/signup", method = "post", tag = "UserTags::Authentication")]
    async fn signup(&self, req: &Request, body: Json<SignupRequest>) -> Result<SignupResponse, ApiError> {
        let ctx = anonymous_context(req);
        let body = body.0;
        let session = self
            .auth_coordinator
            .signup(
                &ctx,
                NewUser {
                    fullname: body.fullname,
                    email: body.email,
                    username: body.username,
                    password: body.password,
                    password_confirm: body.password_confirm,
                },
            )
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(SignupResponse::Created(session_envelope("User created successfully", session)))
    }

    /// Log in with an email or username
    #[oai(path = "/login", method = "post", tag = "UserTags::Authentication")]
    async fn login(&self, req: &Request, body: Json<LoginRequest>) -> Result<Json<Envelope<AuthData>>, ApiError> {
        let ctx = anonymous_context(req);
        let session = self
            .auth_coordinator
            .login(&ctx, &body.identifier, &body.password)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(session_envelope("Logged in successfully", session))
    }

    /// Email a single-use password reset link
    #[oai(path = "/forgot-password", method = "post", tag = "UserTags::Authentication")]
    async fn forgot_password(
        &self,
        req: &Request,
        body: Json<ForgotPasswordRequest>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let ctx = anonymous_context(req);
        self.auth_coordinator
            .forgot_password(&ctx, &body.email)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(MessageResponse::success("Token sent to email")))
    }

    /// Set a new password using a reset token
    #[oai(path = "/reset-password/:token", method = "patch", tag = "UserTags::Authentication")]
    async fn reset_password(
        &self,
        req: &Request,
        token: Path<String>,
        body: Json<ResetPasswordRequest>,
    ) -> Result<Json<Envelope<AuthData>>, ApiError> {
        let ctx = anonymous_context(req);
        let session = self
            .auth_coordinator
            .reset_password(&ctx, &token.0, &body.password, &body.password_confirm)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(session_envelope("Password reset successfully", session))
    }

    /// Change the current password; earlier tokens stop working
    #[oai(path = "/update-my-password", method = "patch", tag = "UserTags::Authentication")]
    async fn update_my_password(
        &self,
        req: &Request,
        body: Json<UpdatePasswordRequest>,
    ) -> Result<Json<Envelope<AuthData>>, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        let session = self
            .auth_coordinator
            .update_password(&ctx, &body.password_current, &body.password, &body.password_confirm)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(session_envelope("Password updated successfully", session))
    }

    #[oai(path = "/me", method = "get", tag = "UserTags::Users")]
    async fn me(&self, req: &Request) -> Result<Json<Envelope<UserData>>, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        let user = self
            .user_coordinator
            .me(&ctx)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "User fetched successfully",
            UserData { user: user.into() },
        )))
    }

    /// Edit fullname or username
    #[oai(path = "/update-me", method = "patch", tag = "UserTags::Users")]
    async fn update_me(
        &self,
        req: &Request,
        body: Json<UpdateMeRequest>,
    ) -> Result<Json<Envelope<UserData>>, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        let body = body.0;
        let user = self
            .user_coordinator
            .update_me(
                &ctx,
                ProfileChanges {
                    fullname: body.fullname,
                    username: body.username,
                    password: body.password,
                    password_confirm: body.password_confirm,
                },
            )
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "User details edited successfully",
            UserData { user: user.into() },
        )))
    }

    /// Replace the avatar image
    #[oai(path = "/me/avatar", method = "put", tag = "UserTags::Users")]
    async fn set_avatar(
        &self,
        req: &Request,
        upload: AvatarUpload,
    ) -> Result<Json<Envelope<UserData>>, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        let file = read_upload(&self.app_data, upload.image).await?;
        let user = self
            .user_coordinator
            .set_avatar(&ctx, file.bytes, file.content_type.as_deref())
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(Json(Envelope::success(
            "Avatar updated successfully",
            UserData { user: user.into() },
        )))
    }

    #[oai(path = "/delete-me", method = "delete", tag = "UserTags::Users")]
    async fn delete_me(&self, req: &Request) -> Result<NoContentResponse, ApiError> {
        let ctx = authenticate(&self.app_data, req).await?;
        self.user_coordinator
            .delete_me(&ctx)
            .await
            .map_err(|e| api_error(&self.app_data, e))?;
        Ok(NoContentResponse::NoContent)
    }
}
