mod cookie;
mod error;
mod gate;
mod handler;
mod router;

pub use cookie::{CookiePolicy, REFRESH_COOKIE};
pub use error::{ApiErrorCode, recover_error};
pub use gate::{AuthContext, with_permission, with_verification};
pub use router::routes;
