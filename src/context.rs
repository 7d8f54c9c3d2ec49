//! Application-wide state, built once in `main` and handed to every screen by
//! reference.

use tracing::info;

use crate::api::ApiClient;
use crate::config::{Config, UserConfig};
use crate::error::{ApiError, FormError};
use crate::format::Currency;
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn initials(&self) -> String {
        [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl From<&UserConfig> for User {
    fn from(config: &UserConfig) -> Self {
        Self {
            id: config.id.clone(),
            first_name: config.first_name.clone(),
            last_name: config.last_name.clone(),
            email: config.email.clone(),
        }
    }
}

/// Mocked authentication: any well-formed email with a non-empty password
/// signs in as the configured profile.
#[derive(Debug, Clone)]
pub struct Session {
    profile: UserConfig,
    user: Option<User>,
}

impl Session {
    pub fn signed_in(profile: &UserConfig) -> Self {
        Self {
            profile: profile.clone(),
            user: Some(User::from(profile)),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.email.as_str())
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, FormError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(FormError::Required("email"));
        }
        if !looks_like_email(email) {
            return Err(FormError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(FormError::Required("password"));
        }

        let mut user = User::from(&self.profile);
        user.email = email.to_string();
        info!(email, "signed in");
        Ok(self.user.insert(user))
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(email = %user.email, "signed out");
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

pub struct AppContext {
    pub config: Config,
    pub theme: Theme,
    pub session: Session,
    pub api: ApiClient,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        Ok(Self {
            theme: Theme::new(config.display.theme),
            session: Session::signed_in(&config.user),
            api,
            config,
        })
    }

    pub fn currency(&self) -> Currency {
        self.config.display.currency
    }

    pub fn service_fee(&self) -> f64 {
        self.config.display.service_fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeMode;

    #[test]
    fn starts_signed_in_as_configured_user() {
        let session = Session::signed_in(&UserConfig::default());
        let user = session.user().unwrap();
        assert_eq!(user.id, "user_test_001");
        assert_eq!(user.full_name(), "John Doe");
        assert_eq!(user.initials(), "JD");
        assert_eq!(session.email(), Some("john.doe@example.com"));
    }

    #[test]
    fn login_validates_and_replaces_email() {
        let mut session = Session::signed_in(&UserConfig::default());
        session.logout();
        assert_eq!(session.email(), None);

        assert_eq!(session.login("", "pw").unwrap_err(), FormError::Required("email"));
        assert_eq!(session.login("jane", "pw").unwrap_err(), FormError::InvalidEmail);
        assert_eq!(session.login("jane@example.com", "").unwrap_err(), FormError::Required("password"));

        let user = session.login(" jane@example.com ", "secret").unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(session.email(), Some("jane@example.com"));
    }

    #[test]
    fn context_follows_config() {
        let mut config = Config::default();
        config.display.theme = ThemeMode::Dark;
        let ctx = AppContext::new(config).unwrap();
        assert!(ctx.theme.is_dark());
        assert_eq!(ctx.currency(), Currency::Idr);
        assert_eq!(ctx.api.base_url(), "http://127.0.0.1:5000/");
    }
}
