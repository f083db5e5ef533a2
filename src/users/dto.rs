use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::repo_types::{User, UserChanges};

/// Request body for registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    #[serde(alias = "passHash", skip_serializing)]
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub address_city: String,
    #[serde(default)]
    pub address_state: String,
    #[serde(default)]
    pub address_zip: String,
    #[serde(default)]
    pub address_country: String,
    #[serde(default)]
    pub roaster_id: Option<Uuid>,
}

impl NewUserRequest {
    pub fn into_user(self, id: Uuid, pass_hash: String) -> User {
        User {
            id,
            pass_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            address_city: self.address_city,
            address_state: self.address_state,
            address_zip: self.address_zip,
            address_country: self.address_country,
            roaster_id: self.roaster_id,
            profile_url: String::new(),
        }
    }
}

/// Request body for a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(alias = "passHash", default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_country: Option<String>,
    /// `Some(None)` is an explicit `null` and detaches the user from their roaster.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub roaster_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
}

fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl UpdateUserRequest {
    /// New plaintext, if one was actually supplied.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    pub fn to_changes(&self, pass_hash: Option<String>) -> UserChanges {
        UserChanges {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address_line1: self.address_line1.clone(),
            address_line2: self.address_line2.clone(),
            address_city: self.address_city.clone(),
            address_state: self.address_state.clone(),
            address_zip: self.address_zip.clone(),
            address_country: self.address_country.clone(),
            roaster_id: self.roaster_id,
            profile_url: self.profile_url.clone(),
            pass_hash,
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(alias = "passHash")]
    pub password: String,
}

/// User as returned to clients: every column except the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub address_country: String,
    pub roaster_id: Option<Uuid>,
    pub profile_url: String,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            address_line1: u.address_line1,
            address_line2: u.address_line2,
            address_city: u.address_city,
            address_state: u.address_state,
            address_zip: u.address_zip,
            address_country: u.address_country,
            roaster_id: u.roaster_id,
            profile_url: u.profile_url,
        }
    }
}

/// Echo of an accepted update.
#[derive(Debug, Serialize)]
pub struct UpdatedUser {
    pub id: Uuid,
    #[serde(flatten)]
    pub changes: UpdateUserRequest,
}
