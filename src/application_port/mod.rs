mod auth_service;
mod credential_signer;
mod permission_service;
mod token_service;

pub use auth_service::*;
pub use credential_signer::*;
pub use permission_service::*;
pub use token_service::*;
