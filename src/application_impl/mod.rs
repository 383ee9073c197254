mod auth_service_impl;
mod credential_signer_jwt;
mod permission_service_impl;
mod token_service_impl;

pub use auth_service_impl::*;
pub use credential_signer_jwt::*;
pub use permission_service_impl::*;
pub use token_service_impl::*;
