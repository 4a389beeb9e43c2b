//! Request and response payloads.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use super::entity::User;
use super::error::UserError;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

/// `POST /register` body.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterUserDto {
    #[validate(email(message = "email must be an email"))]
    pub email: String,

    #[validate(length(min = 1, message = "firstName should not be empty"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "lastName should not be empty"))]
    pub last_name: String,

    #[validate(regex(
        path = *ISO_DATE,
        message = "dateOfBirth must be in ISO format (YYYY-MM-DD)"
    ))]
    pub date_of_birth: String,

    #[validate(length(
        min = 6,
        message = "password must be longer than or equal to 6 characters"
    ))]
    pub password: String,
}

/// `POST /login` body.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginUserDto {
    #[validate(email(message = "email must be an email"))]
    pub email: String,

    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

/// Public view of a user. Carries no password material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            date_of_birth: user.date_of_birth.clone(),
        }
    }
}

/// Decode and validate a request body.
///
/// A missing body is treated as `{}`, so every required field reports its
/// own violation. Type mismatches surface as a single validation message.
pub fn validate_payload<T>(body: Option<&Value>) -> Result<T, UserError>
where
    T: DeserializeOwned + Validate,
{
    let value = body
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));

    let payload: T =
        serde_json::from_value(value).map_err(|e| UserError::Validation(vec![e.to_string()]))?;

    payload
        .validate()
        .map_err(|errors| UserError::Validation(messages(&errors)))?;

    Ok(payload)
}

/// Flatten field errors into messages, ordered by field name.
fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect()
}
