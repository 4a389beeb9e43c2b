//! HTTP routes for the user service.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;

use super::dto::{validate_payload, LoginUserDto, RegisterUserDto, UserResponse};
use super::service::UserService;
use crate::core::{Request, Response, Result};
use crate::server::{Controller, Handler, Router};

/// Binds `POST /register` and `POST /login`.
pub struct UserController {
    service: Arc<UserService>,
}

impl UserController {
    pub fn new(service: Arc<UserService>) -> Self {
        Self { service }
    }
}

impl Controller for UserController {
    fn bind_routes(&self, router: &mut Router) {
        router
            .add_route(
                "POST",
                "/register",
                RegisterHandler {
                    service: Arc::clone(&self.service),
                },
            )
            .add_route(
                "POST",
                "/login",
                LoginHandler {
                    service: Arc::clone(&self.service),
                },
            );
    }
}

struct RegisterHandler {
    service: Arc<UserService>,
}

#[async_trait]
impl Handler for RegisterHandler {
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<()> {
        let dto: RegisterUserDto = validate_payload(req.body())?;
        let user = self.service.register(dto).await?;

        res.status(StatusCode::CREATED)
            .json(&UserResponse::from(&user))
    }
}

struct LoginHandler {
    service: Arc<UserService>,
}

#[async_trait]
impl Handler for LoginHandler {
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<()> {
        let dto: LoginUserDto = validate_payload(req.body())?;
        let users = self.service.login(dto).await?;

        let body: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
        res.json(&body)
    }
}
