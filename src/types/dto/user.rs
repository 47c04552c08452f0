use poem_openapi::{Multipart, Object, types::multipart::Upload};

use crate::types::db::user;
use crate::types::dto::common::to_rfc3339;

/// Public view of a user; never carries hashes or reset state
#[derive(Object, Debug, Clone)]
#[oai(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub username: String,
    pub role: String,
    #[oai(skip_serializing_if_is_none)]
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<user::Model> for UserDto {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            fullname: model.fullname,
            email: model.email,
            username: model.username,
            role: model.role,
            avatar: model.avatar,
            created_at: to_rfc3339(model.created_at),
            updated_at: to_rfc3339(model.updated_at),
        }
    }
}

#[derive(Object, Debug)]
pub struct UserData {
    pub user: UserDto,
}

/// Profile update; password fields are accepted only to be rejected
#[derive(Object, Debug, Default)]
#[oai(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub fullname: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

#[derive(Multipart)]
pub struct AvatarUpload {
    pub image: Upload,
}
