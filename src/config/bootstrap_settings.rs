use std::fmt;
use std::path::PathBuf;

use crate::config::{ApplicationError, EnvironmentProvider, SystemEnvironment, parse_setting};
use crate::errors::ErrorMode;

/// Which notifier delivers outgoing mail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBackend {
    /// Log messages through tracing instead of sending them
    Console,
    Smtp,
}

/// Outgoing mail configuration
#[derive(Clone)]
pub struct MailSettings {
    pub backend: MailBackend,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub mail_from: String,
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("backend", &self.backend)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "<redacted>"))
            .field("mail_from", &self.mail_from)
            .finish()
    }
}

/// Startup settings read once from the environment
#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    database_url: String,
    server_host: String,
    server_port: u16,
    error_mode: ErrorMode,
    jwt_expires_in_days: i64,
    reset_token_ttl_minutes: i64,
    public_base_url: String,
    media_root: PathBuf,
    media_url_prefix: String,
    mail: MailSettings,
    cleanup_max_attempts: u32,
    cleanup_retry_delay_ms: u64,
}

impl BootstrapSettings {
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ApplicationError> {
        let database_url = env.get_or("DATABASE_URL", "sqlite://explorer.db?mode=rwc");
        if database_url.trim().is_empty() {
            return Err(ApplicationError::invalid("DATABASE_URL", "must not be empty"));
        }

        let server_host = env.get_or("HOST", "0.0.0.0");
        if server_host.trim().is_empty() {
            return Err(ApplicationError::invalid("HOST", "must not be empty"));
        }

        let server_port: u16 = parse_setting(env, "PORT", 3000)?;
        if server_port == 0 {
            return Err(ApplicationError::invalid("PORT", "must be between 1 and 65535"));
        }

        let app_env = env.get_or("APP_ENV", "production");
        let error_mode = ErrorMode::from_app_env(&app_env).ok_or_else(|| {
            ApplicationError::invalid("APP_ENV", format!("expected development or production, got '{}'", app_env))
        })?;

        let jwt_expires_in_days: i64 = parse_setting(env, "JWT_EXPIRES_IN_DAYS", 90)?;
        if jwt_expires_in_days <= 0 {
            return Err(ApplicationError::invalid("JWT_EXPIRES_IN_DAYS", "must be positive"));
        }

        let reset_token_ttl_minutes: i64 = parse_setting(env, "RESET_TOKEN_TTL_MINUTES", 10)?;
        if reset_token_ttl_minutes <= 0 {
            return Err(ApplicationError::invalid("RESET_TOKEN_TTL_MINUTES", "must be positive"));
        }

        let public_base_url = env
            .get_or("PUBLIC_BASE_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();

        let media_root = PathBuf::from(env.get_or("MEDIA_ROOT", "./uploads"));
        let media_url_prefix = format!(
            "/{}",
            env.get_or("MEDIA_URL_PREFIX", "/media").trim_matches('/')
        );

        let mail = Self::load_mail_settings(env)?;

        let cleanup_max_attempts: u32 = parse_setting(env, "CLEANUP_MAX_ATTEMPTS", 3)?;
        if cleanup_max_attempts == 0 {
            return Err(ApplicationError::invalid("CLEANUP_MAX_ATTEMPTS", "must be at least 1"));
        }
        let cleanup_retry_delay_ms: u64 = parse_setting(env, "CLEANUP_RETRY_DELAY_MS", 500)?;

        Ok(Self {
            database_url,
            server_host,
            server_port,
            error_mode,
            jwt_expires_in_days,
            reset_token_ttl_minutes,
            public_base_url,
            media_root,
            media_url_prefix,
            mail,
            cleanup_max_attempts,
            cleanup_retry_delay_ms,
        })
    }

    fn load_mail_settings(env: &dyn EnvironmentProvider) -> Result<MailSettings, ApplicationError> {
        let backend = match env.get_or("MAIL_BACKEND", "console").trim().to_ascii_lowercase().as_str() {
            "console" => MailBackend::Console,
            "smtp" => MailBackend::Smtp,
            other => {
                return Err(ApplicationError::invalid(
                    "MAIL_BACKEND",
                    format!("expected console or smtp, got '{}'", other),
                ));
            }
        };

        let smtp_host = env.get_var("SMTP_HOST").filter(|h| !h.trim().is_empty());
        if backend == MailBackend::Smtp && smtp_host.is_none() {
            return Err(ApplicationError::missing("SMTP_HOST"));
        }

        Ok(MailSettings {
            backend,
            smtp_host,
            smtp_port: parse_setting(env, "SMTP_PORT", 587)?,
            smtp_username: env.get_var("SMTP_USERNAME"),
            smtp_password: env.get_var("SMTP_PASSWORD"),
            mail_from: env.get_or("MAIL_FROM", "Explorer <no-reply@explorer.local>"),
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ApplicationError> {
        Self::from_env_provider(&SystemEnvironment)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    pub fn jwt_expires_in_days(&self) -> i64 {
        self.jwt_expires_in_days
    }

    pub fn reset_token_ttl_minutes(&self) -> i64 {
        self.reset_token_ttl_minutes
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn media_root(&self) -> &PathBuf {
        &self.media_root
    }

    pub fn media_url_prefix(&self) -> &str {
        &self.media_url_prefix
    }

    pub fn mail(&self) -> &MailSettings {
        &self.mail
    }

    pub fn cleanup_max_attempts(&self) -> u32 {
        self.cleanup_max_attempts
    }

    pub fn cleanup_retry_delay_ms(&self) -> u64 {
        self.cleanup_retry_delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    #[test]
    fn test_bootstrap_settings_with_defaults() {
        let settings = BootstrapSettings::from_env_provider(&MockEnvironment::empty()).unwrap();

        assert_eq!(settings.database_url(), "sqlite://explorer.db?mode=rwc");
        assert_eq!(settings.server_address(), "0.0.0.0:3000");
        assert_eq!(settings.error_mode(), ErrorMode::Production);
        assert_eq!(settings.jwt_expires_in_days(), 90);
        assert_eq!(settings.reset_token_ttl_minutes(), 10);
        assert_eq!(settings.public_base_url(), "http://localhost:3000");
        assert_eq!(settings.media_url_prefix(), "/media");
        assert_eq!(settings.mail().backend, MailBackend::Console);
        assert_eq!(settings.cleanup_max_attempts(), 3);
        assert_eq!(settings.cleanup_retry_delay_ms(), 500);
    }

    #[test]
    fn test_bootstrap_settings_with_all_vars() {
        let env = MockEnvironment::empty().with_vars(&[
            ("DATABASE_URL", "sqlite://test.db"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("APP_ENV", "development"),
            ("JWT_EXPIRES_IN_DAYS", "7"),
            ("PUBLIC_BASE_URL", "https://explorer.example.com/"),
            ("MEDIA_URL_PREFIX", "files/"),
            ("MAIL_BACKEND", "smtp"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
        ]);

        let settings = BootstrapSettings::from_env_provider(&env).unwrap();

        assert_eq!(settings.server_address(), "127.0.0.1:8080");
        assert_eq!(settings.error_mode(), ErrorMode::Development);
        assert_eq!(settings.jwt_expires_in_days(), 7);
        assert_eq!(settings.public_base_url(), "https://explorer.example.com");
        assert_eq!(settings.media_url_prefix(), "/files");
        assert_eq!(settings.mail().backend, MailBackend::Smtp);
        assert_eq!(settings.mail().smtp_port, 2525);
    }

    #[test]
    fn test_invalid_port_fails() {
        let env = MockEnvironment::empty().with_var("PORT", "0");
        match BootstrapSettings::from_env_provider(&env) {
            Err(ApplicationError::InvalidSetting { setting_name, .. }) => assert_eq!(setting_name, "PORT"),
            other => panic!("Expected InvalidSetting for PORT, got: {:?}", other),
        }

        let env = MockEnvironment::empty().with_var("PORT", "70000");
        assert!(matches!(
            BootstrapSettings::from_env_provider(&env),
            Err(ApplicationError::ParseError { .. })
        ));
    }

    #[test]
    fn test_unknown_app_env_fails() {
        let env = MockEnvironment::empty().with_var("APP_ENV", "staging");
        match BootstrapSettings::from_env_provider(&env) {
            Err(ApplicationError::InvalidSetting { setting_name, .. }) => assert_eq!(setting_name, "APP_ENV"),
            other => panic!("Expected InvalidSetting for APP_ENV, got: {:?}", other),
        }
    }

    #[test]
    fn test_smtp_backend_requires_host() {
        let env = MockEnvironment::empty().with_var("MAIL_BACKEND", "smtp");
        assert!(matches!(
            BootstrapSettings::from_env_provider(&env),
            Err(ApplicationError::MissingSetting { .. })
        ));
    }

    #[test]
    fn test_smtp_password_is_redacted() {
        let env = MockEnvironment::empty().with_var("SMTP_PASSWORD", "hunter2-secret");
        let settings = BootstrapSettings::from_env_provider(&env).unwrap();
        assert!(!format!("{:?}", settings).contains("hunter2-secret"));
    }
}
