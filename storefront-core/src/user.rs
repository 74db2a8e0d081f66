use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::patch::{present, required};
use crate::CoreResult;

pub const DUPLICATE_EMAIL: &str = "A user with this email already exists.";

/// A registered customer. Owns its orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: i64,
    #[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters."))]
    pub name: String,
    #[validate(length(max = 255, message = "address must be at most 255 characters."))]
    pub address: Option<String>,
    #[validate(
        email(message = "email must be a valid email address."),
        length(max = 120, message = "email must be at most 120 characters.")
    )]
    pub email: String,
}

impl User {
    /// Replace the fields present in `patch`, leaving the others untouched.
    /// A `null` address clears it; `null` for name or email is rejected.
    /// The result still has to pass `validate`.
    pub fn apply(&mut self, patch: UserPatch) -> CoreResult<()> {
        if let Some(name) = patch.name {
            self.name = required("name", name)?;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(email) = patch.email {
            self.email = required("email", email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 120, message = "name must be between 1 and 120 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "address must be at most 255 characters."))]
    pub address: Option<String>,
    #[validate(
        email(message = "email must be a valid email address."),
        length(max = 120, message = "email must be at most 120 characters.")
    )]
    pub email: String,
}

/// Body of `PUT /users/{id}`. Outer `None` means the field was absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
}
