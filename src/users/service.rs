//! Registration and login.

use std::sync::Arc;

use tracing::{debug, info};

use super::dto::{LoginUserDto, RegisterUserDto};
use super::entity::{NewUser, User};
use super::error::UserError;
use super::hasher::PasswordHasher;
use super::repository::UserRepository;

/// User use cases over a repository and a password hasher.
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Register a new user. The email must not be taken.
    pub async fn register(&self, dto: RegisterUserDto) -> Result<User, UserError> {
        if self.repo.find_by_email(&dto.email).await?.is_some() {
            return Err(UserError::AlreadyExists(dto.email));
        }

        let password_hash = self.hasher.hash(&dto.password).await?;
        let user = self
            .repo
            .create(NewUser {
                email: dto.email,
                first_name: dto.first_name,
                last_name: dto.last_name,
                date_of_birth: dto.date_of_birth,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and return every registered user.
    pub async fn login(&self, dto: LoginUserDto) -> Result<Vec<User>, UserError> {
        let Some(user) = self.repo.find_by_email(&dto.email).await? else {
            debug!("login for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !self.hasher.verify(&dto.password, &user.password_hash).await? {
            debug!(user_id = user.id, "login with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        self.repo.find_all().await
    }
}
