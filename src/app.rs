//! Composition root: wires storage, hashing, middleware, filters and routes.

use std::sync::Arc;

use crate::config::Config;
use crate::filter::HttpErrorFilter;
use crate::middleware::json_body::JsonBodyMiddleware;
use crate::server::{Server, ServerConfig};
use crate::users::{
    Argon2Hasher, InvalidCredentialsFilter, PasswordHasher, SqliteUserRepository,
    UserAlreadyExistsFilter, UserController, UserError, UserService, ValidationFilter,
};

/// Build the user service with the production Argon2 parameters.
pub fn build_server(config: &Config) -> Result<Server, UserError> {
    build_server_with(config, Arc::new(Argon2Hasher::new()))
}

/// Build the user service with a caller-supplied password hasher.
///
/// Middleware: JSON body decoding. Filter order: domain filters first,
/// framework filter last.
pub fn build_server_with(
    config: &Config,
    hasher: Arc<dyn PasswordHasher>,
) -> Result<Server, UserError> {
    let repo = SqliteUserRepository::from_config(&config.database)?;
    let service = Arc::new(UserService::new(Arc::new(repo), hasher));

    let server_config = ServerConfig::from(&config.server).with_access_log(config.access_log);
    let mut server = Server::new(server_config);

    server
        .use_middleware(JsonBodyMiddleware)
        .use_filter(ValidationFilter)
        .use_filter(UserAlreadyExistsFilter)
        .use_filter(InvalidCredentialsFilter)
        .use_filter(HttpErrorFilter)
        .use_controller(&UserController::new(service));

    Ok(server)
}
