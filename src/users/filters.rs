//! Exception filters for user domain failures.
//!
//! Register these before [`crate::filter::HttpErrorFilter`]; none of them
//! overlaps with it, but keeping domain filters first means a broader filter
//! added later cannot shadow them.

use async_trait::async_trait;
use http::StatusCode;
use serde_json::json;

use super::error::UserError;
use crate::core::{Error, Request, Response, Result};
use crate::filter::ExceptionFilter;

fn user_error(err: &Error) -> Option<&UserError> {
    err.downcast_ref::<UserError>()
}

/// [`UserError::Validation`] → 422 `{"errors": [...]}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValidationFilter;

#[async_trait]
impl ExceptionFilter for ValidationFilter {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn can_handle(&self, err: &Error) -> bool {
        matches!(user_error(err), Some(UserError::Validation(_)))
    }

    async fn catch(&self, err: &Error, _req: &Request, res: &mut Response) -> Result<()> {
        let errors = match user_error(err) {
            Some(UserError::Validation(errors)) => errors.as_slice(),
            _ => &[],
        };
        res.status(StatusCode::UNPROCESSABLE_ENTITY)
            .json(&json!({ "errors": errors }))
    }
}

/// [`UserError::AlreadyExists`] → 409.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserAlreadyExistsFilter;

#[async_trait]
impl ExceptionFilter for UserAlreadyExistsFilter {
    fn name(&self) -> &'static str {
        "user_already_exists"
    }

    fn can_handle(&self, err: &Error) -> bool {
        matches!(user_error(err), Some(UserError::AlreadyExists(_)))
    }

    async fn catch(&self, err: &Error, _req: &Request, res: &mut Response) -> Result<()> {
        res.status(StatusCode::CONFLICT)
            .json(&json!({ "error": err.to_string() }))
    }
}

/// [`UserError::InvalidCredentials`] → 401.
#[derive(Debug, Default, Clone, Copy)]
pub struct InvalidCredentialsFilter;

#[async_trait]
impl ExceptionFilter for InvalidCredentialsFilter {
    fn name(&self) -> &'static str {
        "invalid_credentials"
    }

    fn can_handle(&self, err: &Error) -> bool {
        matches!(user_error(err), Some(UserError::InvalidCredentials))
    }

    async fn catch(&self, err: &Error, _req: &Request, res: &mut Response) -> Result<()> {
        res.status(StatusCode::UNAUTHORIZED)
            .json(&json!({ "error": err.to_string() }))
    }
}
