/**
 * User Service
 *
 * Registration input validation and the local password flow: hash and store
 * on register, verify and issue a session token on login.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::backend::auth::password::{hash_password, verify_password};
use crate::backend::auth::sessions::TokenIssuer;
use crate::backend::directory::UserDirectory;
use crate::backend::error::ApiError;
use crate::shared::{NewUser, Role, SharedError, UserProfile};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap_or_else(|err| {
        unreachable!("email pattern is a valid regex: {err}")
    })
});

/// Verified against when the email is unknown so both failure paths hash once
static DUMMY_HASH: Lazy<String> = Lazy::new(|| hash_password("not-a-real-password"));

/// A validated registration request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    /// Set iff `role == Child`
    pub parent_id: Option<String>,
}

pub(crate) fn required_str<'a>(body: &'a Map<String, Value>, field: &str) -> Result<&'a str, SharedError> {
    match body.get(field) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text),
        Some(Value::String(_)) | Some(Value::Null) | None => Err(SharedError::missing(field)),
        Some(_) => Err(SharedError::validation(
            field,
            format!("Field '{field}' must be a string"),
        )),
    }
}

fn optional_str<'a>(body: &'a Map<String, Value>, field: &str) -> Result<Option<&'a str>, SharedError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.trim())),
        Some(_) => Err(SharedError::validation(
            field,
            format!("Field '{field}' must be a string"),
        )),
    }
}

impl Registration {
    /// Validate a registration body.
    ///
    /// Checks run in order: required fields, email format, password length,
    /// role, parent id for children.
    pub fn from_json(
        body: &Map<String, Value>,
        password_min_length: usize,
    ) -> Result<Self, SharedError> {
        let email = required_str(body, "email")?.trim();
        let name = required_str(body, "name")?.trim();
        let password = required_str(body, "password")?;

        if !EMAIL_RE.is_match(email) {
            return Err(SharedError::validation("email", "Invalid email format"));
        }
        if password.chars().count() < password_min_length {
            return Err(SharedError::validation(
                "password",
                format!("Password must be at least {password_min_length} characters long"),
            ));
        }

        let role = match optional_str(body, "role")? {
            Some(role) => role.parse::<Role>()?,
            None => Role::default(),
        };
        let parent_id = optional_str(body, "parent_id")?.map(str::to_string);
        if role == Role::Child && parent_id.is_none() {
            return Err(SharedError::validation(
                "parent_id",
                "Parent ID is required for child users",
            ));
        }

        Ok(Self {
            email: email.to_lowercase(),
            name: name.to_string(),
            password: password.to_string(),
            role,
            parent_id: parent_id.filter(|_| role == Role::Child),
        })
    }
}

/// Reject a registration whose email is already in the directory
pub async fn ensure_email_available(directory: &UserDirectory, email: &str) -> Result<(), ApiError> {
    if directory.get_by_email(email).await?.is_some() {
        tracing::warn!(%email, "registration rejected: email already registered");
        return Err(ApiError::bad_request("User with this email already exists"));
    }
    Ok(())
}

/// A child's parent must exist and hold at least the parent role
pub async fn ensure_parent_exists(
    directory: &UserDirectory,
    registration: &Registration,
) -> Result<(), ApiError> {
    let Some(parent_id) = &registration.parent_id else {
        return Ok(());
    };
    match directory.get_by_id(parent_id).await? {
        Some(parent) if parent.role >= Role::Parent => Ok(()),
        _ => {
            tracing::warn!(%parent_id, "registration rejected: unknown parent");
            Err(ApiError::bad_request("Parent user not found"))
        }
    }
}

/// Local registration and password authentication
#[derive(Debug, Clone)]
pub struct UserService {
    directory: UserDirectory,
    issuer: TokenIssuer,
}

impl UserService {
    pub fn new(directory: UserDirectory, issuer: TokenIssuer) -> Self {
        Self { directory, issuer }
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Hash the password and create the user
    pub async fn register(&self, registration: Registration) -> Result<UserProfile, ApiError> {
        ensure_email_available(&self.directory, &registration.email).await?;
        ensure_parent_exists(&self.directory, &registration).await?;

        let password_hash = hash_password(&registration.password);
        let profile = self
            .directory
            .create_user(NewUser {
                id: None,
                email: registration.email,
                name: registration.name,
                role: registration.role,
                password_hash: Some(password_hash),
                parent_id: registration.parent_id,
            })
            .await?;
        Ok(profile)
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown email and wrong password both yield `None`.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<(UserProfile, String)>, ApiError> {
        let Some(user) = self.directory.get_by_email(email).await? else {
            verify_password(&DUMMY_HASH, password);
            tracing::warn!(%email, "login failed: unknown email");
            return Ok(None);
        };
        let Some(stored) = user.password_hash.as_deref() else {
            tracing::warn!(user_id = %user.id, "login failed: account has no local password");
            return Ok(None);
        };
        if !verify_password(stored, password) {
            tracing::warn!(user_id = %user.id, "login failed: wrong password");
            return Ok(None);
        }

        let token = self
            .issuer
            .issue(&user.id, user.role)
            .map_err(|err| ApiError::server("Error generating token", err))?;
        tracing::info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok(Some((user.into_profile(), token)))
    }
}
