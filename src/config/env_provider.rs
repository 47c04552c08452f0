use std::str::FromStr;

use crate::config::ApplicationError;

/// Trait for providing environment variable access
///
/// Lets settings be loaded from an injected source so tests never touch the
/// process-global environment.
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;

    /// Value of `key`, or `default` when unset
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get_var(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse `key` into `T`, falling back to `default` when unset
pub fn parse_setting<T>(env: &dyn EnvironmentProvider, key: &str, default: T) -> Result<T, ApplicationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env.get_var(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ApplicationError::ParseError {
            setting_name: key.to_string(),
            error: format!("'{}': {}", raw, e),
        }),
    }
}

/// Production environment provider that reads from system environment
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Test environment provider with configurable variables
#[cfg(test)]
pub struct MockEnvironment {
    vars: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl MockEnvironment {
    pub fn empty() -> Self {
        Self {
            vars: std::collections::HashMap::new(),
        }
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_vars(mut self, vars: &[(&str, &str)]) -> Self {
        for (key, value) in vars {
            self.vars.insert(key.to_string(), value.to_string());
        }
        self
    }
}

#[cfg(test)]
impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
