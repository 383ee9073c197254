mod permission;
mod token;
mod user;

pub use permission::*;
pub use token::*;
pub use user::*;
