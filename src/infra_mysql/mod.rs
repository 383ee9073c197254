mod account_repo_mysql;
mod rbac_repo_mysql;

pub use account_repo_mysql::*;
pub use rbac_repo_mysql::*;

mod util;
