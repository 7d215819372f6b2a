use crate::error::Error;
use chrono::{DateTime, Utc};
use entity::{users, Id, Timestamp};
use entity_api::user as user_api;
use log::*;
use mongodb::bson::{doc, Document};
use mongodb::Database;
use serde::{Deserialize, Serialize};

/// bcrypt work factor for new password hashes.
pub const PASSWORD_HASH_COST: u32 = 10;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// A dashboard account without its password hash.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub role: String,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: model.username,
            name: model.name,
            role: model.role,
            created_at: model.created_at.map(|at| at.to_chrono()),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

// Keeps passwords out of debug logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Name and/or password change. Empty strings count as not given.
#[derive(Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserUpdate")
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl UserUpdate {
    /// The `$set` document, with the new password already hashed.
    pub async fn into_set_document(self, now: Timestamp) -> Result<Document, Error> {
        let name = present(self.name);
        let password = present(self.password);
        if name.is_none() && password.is_none() {
            return Err(Error::invalid(
                "At least one field (name or password) is required for update",
            ));
        }

        let mut fields = doc! { "updatedAt": now };
        if let Some(name) = name {
            fields.insert("name", name);
        }
        if let Some(password) = password {
            fields.insert("password", hash_password(password).await?);
        }
        Ok(fields)
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

pub async fn find_all(db: &Database) -> Result<Vec<User>, Error> {
    let users = user_api::find_all(db).await?;
    Ok(users.into_iter().map(User::from).collect())
}

async fn hash_password(password: String) -> Result<String, Error> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, PASSWORD_HASH_COST)).await??)
}

async fn verify_password(password: String, hash: String) -> Result<bool, Error> {
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}

pub async fn create(db: &Database, params: NewUser) -> Result<User, Error> {
    let (username, password, name, role) = match (
        present(params.username),
        present(params.password),
        present(params.name),
        present(params.role),
    ) {
        (Some(username), Some(password), Some(name), Some(role)) => {
            (username, password, name, role)
        }
        _ => return Err(Error::invalid("Missing required fields")),
    };

    if user_api::find_by_username(db, &username).await?.is_some() {
        return Err(Error::conflict("Username already exists"));
    }

    let mut model = users::Model {
        id: None,
        username,
        password: hash_password(password).await?,
        name,
        role,
        created_at: Some(Timestamp::now()),
        updated_at: None,
    };

    model.id = Some(user_api::create(db, &model).await?);
    info!("Created user {} with role {}", model.username, model.role);

    Ok(User::from(model))
}

fn parse_user_id(id: Option<&str>) -> Result<Id, Error> {
    let id = id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::invalid("User ID is required"))?;
    entity_api::parse_object_id(id).map_err(|e| Error {
        source: Some(Box::new(e)),
        ..Error::invalid("Invalid user ID format")
    })
}

pub async fn find_by_id(db: &Database, id: &str) -> Result<User, Error> {
    let id = parse_user_id(Some(id))?;

    user_api::find_by_id(db, id)
        .await?
        .map(User::from)
        .ok_or_else(|| Error::not_found("User not found"))
}

/// Renames the user and/or sets a new password.
pub async fn update(db: &Database, id: &str, params: UserUpdate) -> Result<(), Error> {
    // Fields first: an empty update is reported before a malformed id
    let fields = params.into_set_document(Timestamp::now()).await?;
    let id = parse_user_id(Some(id))?;

    if !user_api::update(db, id, fields).await? {
        return Err(Error::not_found("User not found"));
    }
    info!("Updated user {id}");

    Ok(())
}

pub async fn delete(db: &Database, id: Option<&str>) -> Result<(), Error> {
    let id = parse_user_id(id)?;

    if !user_api::delete_by_id(db, id).await? {
        return Err(Error::not_found("User not found"));
    }

    Ok(())
}

/// Checks a username/password pair against the stored bcrypt hash.
pub async fn authenticate(db: &Database, credentials: Credentials) -> Result<User, Error> {
    let (username, password) = match (
        present(credentials.username),
        present(credentials.password),
    ) {
        (Some(username), Some(password)) => (username, password),
        _ => return Err(Error::invalid("Username and password are required")),
    };

    let Some(user) = user_api::find_by_username(db, &username).await? else {
        debug!("Login attempt for unknown user {username}");
        return Err(Error::unauthenticated(INVALID_CREDENTIALS));
    };

    if !verify_password(password, user.password.clone()).await? {
        debug!("Login attempt with wrong password for {username}");
        return Err(Error::unauthenticated(INVALID_CREDENTIALS));
    }

    Ok(User::from(user))
}
