use poem_openapi::Object;

use crate::types::dto::user::UserDto;

#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct SignupRequest {
    pub fullname: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// Login request; `identifier` is an email or a username
#[derive(Object, Debug)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Object, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub password_confirm: String,
}

#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub password_current: String,
    pub password: String,
    pub password_confirm: String,
}

/// Session token plus the user it was issued for
#[derive(Object, Debug)]
pub struct AuthData {
    pub token: String,
    pub user: UserDto,
}
