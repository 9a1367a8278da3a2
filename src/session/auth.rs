use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::{check_status, config::AppConfig, error::Result, http_client, Error, FormErrors, Session};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_USERNAME_LEN: usize = 3;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_password(password: &str, errors: &mut FormErrors) {
    if password.is_empty() {
        errors.add("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 6 characters");
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username_or_email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::default();
        if self.username_or_email.trim().is_empty() {
            errors.add("usernameOrEmail", "Username or email is required");
        }
        check_password(&self.password, &mut errors);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::default();

        if self.username.trim().is_empty() {
            errors.add("username", "Username is required");
        } else if self.username.chars().count() < MIN_USERNAME_LEN {
            errors.add("username", "Username must be at least 3 characters");
        }

        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.add("email", "Please enter a valid email address");
        }

        check_password(&self.password, &mut errors);
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords do not match");
        }

        errors.into_result()
    }
}

/// Request a password reset link
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::default();
        let email = self.email.trim();
        if email.is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(email) {
            errors.add("email", "Please enter a valid email address");
        }
        errors.into_result()
    }
}

/// The login endpoint looks the identifier up as either field
#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

pub struct AuthClient {
    client: Client,
    api_base_url: String,
}

impl AuthClient {
    pub fn new(config: &AppConfig) -> Result<AuthClient> {
        Ok(Self {
            client: http_client(config)?,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Validate the form and sign in; a 401 becomes `Error::InvalidCredentials`
    pub async fn login(&self, form: &LoginForm) -> Result<Session> {
        form.validate()?;
        let identifier = form.username_or_email.trim();
        let body = Credentials {
            username: identifier,
            email: identifier,
            password: &form.password,
        };

        let url = format!("{}/api/v1/login/user-login", self.api_base_url);
        let response = check_status(self.client.post(&url).json(&body).send().await?).await?;
        let session = response.json::<Session>().await?;
        info!(id = %session.id, "signed in");

        Ok(session)
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<()> {
        form.validate()?;
        let body = Credentials {
            username: form.username.trim(),
            email: form.email.trim(),
            password: &form.password,
        };

        let url = format!("{}/api/v1/login/create", self.api_base_url);
        check_status(self.client.post(&url).json(&body).send().await?).await?;
        info!(username = body.username, "registered");

        Ok(())
    }

    /// Ask the server to mail a reset link; an unknown address is a 404
    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<()> {
        form.validate()?;
        let body = ForgotPasswordForm {
            email: form.email.trim().to_string(),
        };

        let url = format!("{}/api/v1/auth/forgot-password", self.api_base_url);
        let response = self.client.post(&url).json(&body).send().await?;
        if let Err(e) = check_status(response).await {
            return Err(match e {
                Error::Api { status: 404, .. } => Error::Api {
                    status: 404,
                    message: "No account found with this email address".to_string(),
                },
                other => other,
            });
        }
        info!(email = %body.email, "password reset requested");

        Ok(())
    }
}
