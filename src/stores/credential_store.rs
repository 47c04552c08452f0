use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::{CredentialError, database::is_unique_violation};
use crate::types::db::user::{self, ActiveModel, Entity as User};
use crate::types::internal::auth::{Role, looks_like_email};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Fields required to register an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub fullname: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// CredentialStore manages user identity, password hashes and reset-token state
///
/// Every operation takes the connection to run on, so coordinators can pass
/// either the pool or an open transaction.
pub struct CredentialStore {
    db: DatabaseConnection,
    password_pepper: String,
}

impl CredentialStore {
    /// Create a new CredentialStore
    ///
    /// # Arguments
    /// * `db` - The database connection
    /// * `password_pepper` - The secret key used for password hashing (from SecretManager)
    pub fn new(db: DatabaseConnection, password_pepper: String) -> Self {
        Self { db, password_pepper }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(
            self.password_pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::PasswordHashingFailed(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Check a plaintext password against a stored user's hash
    pub fn verify_password(&self, user: &user::Model, password: &str) -> Result<bool, InternalError> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| InternalError::parse("password_hash", e.to_string()))?;
        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Enforce password length and confirmation
    pub fn validate_new_password(password: &str, password_confirm: &str) -> Result<(), InternalError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CredentialError::PasswordValidationFailed(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ))
            .into());
        }
        if password != password_confirm {
            return Err(CredentialError::PasswordMismatch.into());
        }
        Ok(())
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find_by_id(user_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    pub async fn find_by_email<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_email", e))
    }

    pub async fn find_by_username<C: ConnectionTrait>(
        &self,
        conn: &C,
        username: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::Username.eq(username.trim()))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_username", e))
    }

    /// Look up by email when the identifier is an email, otherwise by username
    pub async fn find_by_email_or_username<C: ConnectionTrait>(
        &self,
        conn: &C,
        identifier: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        if looks_like_email(identifier) {
            self.find_by_email(conn, identifier).await
        } else {
            self.find_by_username(conn, identifier).await
        }
    }

    /// Register a new user with role `user`
    pub async fn create_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        new_user: NewUser,
    ) -> Result<user::Model, InternalError> {
        let fullname = new_user.fullname.trim().to_string();
        let email = new_user.email.trim().to_lowercase();
        let username = new_user.username.trim().to_string();

        if fullname.is_empty() {
            return Err(InternalError::validation("Please tell us your name"));
        }
        if email.is_empty() {
            return Err(InternalError::validation("Please provide your email"));
        }
        if !looks_like_email(&email) {
            return Err(InternalError::validation("Please provide a valid email"));
        }
        if username.is_empty() {
            return Err(InternalError::validation("Please provide a username"));
        }
        if looks_like_email(&username) {
            return Err(InternalError::validation("Username must not be an email address"));
        }
        Self::validate_new_password(&new_user.password, &new_user.password_confirm)?;

        if self.find_by_email(conn, &email).await?.is_some() {
            return Err(CredentialError::DuplicateEmail(email).into());
        }
        if self.find_by_username(conn, &username).await?.is_some() {
            return Err(CredentialError::DuplicateUsername(username).into());
        }

        let password_hash = self.hash_password(&new_user.password)?;
        let now = Utc::now().timestamp();

        let model = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            fullname: Set(fullname),
            email: Set(email.clone()),
            username: Set(username.clone()),
            password_hash: Set(password_hash),
            role: Set(Role::User.as_str().to_string()),
            avatar: Set(None),
            password_changed_at: Set(None),
            password_reset_token: Set(None),
            password_reset_expires: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                if e.to_string().contains("email") {
                    CredentialError::DuplicateEmail(email).into()
                } else {
                    CredentialError::DuplicateUsername(username).into()
                }
            } else {
                InternalError::database("insert_user", e)
            }
        })
    }

    /// Verify user credentials and return the user on success
    ///
    /// Unknown identifier and wrong password produce the same error.
    pub async fn verify_credentials<C: ConnectionTrait>(
        &self,
        conn: &C,
        identifier: &str,
        password: &str,
    ) -> Result<user::Model, InternalError> {
        let user = self
            .find_by_email_or_username(conn, identifier)
            .await?
            .ok_or_else(|| CredentialError::invalid_credentials(identifier))?;

        if !self.verify_password(&user, password)? {
            return Err(CredentialError::invalid_credentials(identifier).into());
        }

        Ok(user)
    }

    /// Replace the password, stamp `password_changed_at` and clear reset state
    pub async fn set_password<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<user::Model, InternalError> {
        Self::validate_new_password(password, password_confirm)?;

        let user = self
            .find_by_id(conn, user_id)
            .await?
            .ok_or_else(|| CredentialError::UserNotFound("ID".to_string()))?;

        let password_hash = self.hash_password(password)?;
        let now = Utc::now().timestamp();

        let mut active = user.into_active_model();
        active.password_hash = Set(password_hash);
        active.password_changed_at = Set(Some(now));
        active.password_reset_token = Set(None);
        active.password_reset_expires = Set(None);
        active.updated_at = Set(now);

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_password", e))
    }

    pub async fn store_reset_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        token_hash: String,
        expires_at: i64,
    ) -> Result<(), InternalError> {
        User::update_many()
            .col_expr(user::Column::PasswordResetToken, Expr::value(Some(token_hash)))
            .col_expr(user::Column::PasswordResetExpires, Expr::value(Some(expires_at)))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("store_reset_token", e))?;
        Ok(())
    }

    pub async fn clear_reset_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> Result<(), InternalError> {
        User::update_many()
            .col_expr(user::Column::PasswordResetToken, Expr::value(Option::<String>::None))
            .col_expr(user::Column::PasswordResetExpires, Expr::value(Option::<i64>::None))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_reset_token", e))?;
        Ok(())
    }

    /// Match only a stored hash whose expiry is still in the future
    pub async fn find_by_reset_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        token_hash: &str,
        now: i64,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::PasswordResetToken.eq(token_hash))
            .filter(user::Column::PasswordResetExpires.gt(now))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_reset_token", e))
    }

    /// Update the editable profile fields; unset fields are left alone
    pub async fn update_profile<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        fullname: Option<String>,
        username: Option<String>,
    ) -> Result<user::Model, InternalError> {
        let user = self
            .find_by_id(conn, user_id)
            .await?
            .ok_or_else(|| InternalError::not_found("user", user_id))?;

        let mut active = user.into_active_model();

        if let Some(fullname) = fullname {
            let fullname = fullname.trim().to_string();
            if fullname.is_empty() {
                return Err(InternalError::validation("Please tell us your name"));
            }
            active.fullname = Set(fullname);
        }

        if let Some(username) = username {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(InternalError::validation("Please provide a username"));
            }
            if looks_like_email(&username) {
                return Err(InternalError::validation("Username must not be an email address"));
            }
            if let Some(existing) = self.find_by_username(conn, &username).await? {
                if existing.id != user_id {
                    return Err(CredentialError::DuplicateUsername(username).into());
                }
            }
            active.username = Set(username);
        }

        active.updated_at = Set(Utc::now().timestamp());
        active.update(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                CredentialError::DuplicateUsername("username".to_string()).into()
            } else {
                InternalError::database("update_profile", e)
            }
        })
    }

    /// Set the avatar URL, returning the updated user and the replaced URL
    pub async fn set_avatar<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        avatar_url: String,
    ) -> Result<(user::Model, Option<String>), InternalError> {
        let user = self
            .find_by_id(conn, user_id)
            .await?
            .ok_or_else(|| InternalError::not_found("user", user_id))?;
        let previous = user.avatar.clone();

        let mut active = user.into_active_model();
        active.avatar = Set(Some(avatar_url));
        active.updated_at = Set(Utc::now().timestamp());

        let updated = active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_avatar", e))?;
        Ok((updated, previous))
    }

    /// Change the role of the user named by email or username
    pub async fn set_role<C: ConnectionTrait>(
        &self,
        conn: &C,
        identifier: &str,
        role: Role,
    ) -> Result<user::Model, InternalError> {
        let user = self
            .find_by_email_or_username(conn, identifier)
            .await?
            .ok_or_else(|| CredentialError::UserNotFound(identifier.to_string()))?;

        let mut active = user.into_active_model();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_role", e))
    }

    pub async fn delete_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> Result<(), InternalError> {
        let result = User::delete_by_id(user_id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_user", e))?;

        if result.rows_affected == 0 {
            return Err(InternalError::not_found("user", user_id));
        }
        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("db", &"<connection>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}
