//! User registration and login.
//!
//! ```text
//! UserController ─→ UserService ─┬─→ UserRepository (SQLite)
//!                                └─→ PasswordHasher (Argon2id)
//! ```
//!
//! Domain failures are [`UserError`]s; they cross into the dispatch core as
//! [`crate::core::Error::Upstream`] and are turned into responses by the
//! filters in [`filters`].

mod controller;
mod dto;
mod entity;
mod error;
pub mod filters;
mod hasher;
mod repository;
mod service;

pub use controller::UserController;
pub use dto::{validate_payload, LoginUserDto, RegisterUserDto, UserResponse};
pub use entity::{NewUser, User};
pub use error::UserError;
pub use filters::{InvalidCredentialsFilter, UserAlreadyExistsFilter, ValidationFilter};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use repository::{SqliteUserRepository, UserRepository};
pub use service::UserService;
