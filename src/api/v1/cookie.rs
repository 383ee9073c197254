use crate::domain_model::RefreshToken;
use crate::settings::Cookie;
use chrono::{DateTime, Utc};
use std::convert::Infallible;
use warp::Filter;

pub const REFRESH_COOKIE: &str = "refresh_token";

/// Attributes of the refresh-token cookie. The token itself never appears in a response body.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub path: String,
    pub secure: bool,
}

impl CookiePolicy {
    pub fn set_refresh(&self, token: &RefreshToken, expires_at: DateTime<Utc>) -> String {
        let max_age = (expires_at - Utc::now()).num_seconds().max(0);
        self.render(&token.0, max_age)
    }

    pub fn clear_refresh(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{REFRESH_COOKIE}={value}; Path={}; Max-Age={max_age}; HttpOnly; SameSite=Strict",
            self.path
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl From<&Cookie> for CookiePolicy {
    fn from(cookie: &Cookie) -> Self {
        CookiePolicy {
            path: cookie.path.clone(),
            secure: cookie.secure,
        }
    }
}

pub fn with_refresh_cookie() -> impl Filter<Extract = (Option<RefreshToken>,), Error = Infallible> + Clone
{
    warp::cookie::optional::<String>(REFRESH_COOKIE).map(|value: Option<String>| {
        value
            .filter(|v| !v.is_empty())
            .map(RefreshToken)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn policy(secure: bool) -> CookiePolicy {
        CookiePolicy {
            path: "/api/v1".to_string(),
            secure,
        }
    }

    #[test]
    fn refresh_cookie_is_http_only_and_scoped() {
        let token = RefreshToken("abc.def.ghi".to_string());
        let cookie = policy(true).set_refresh(&token, Utc::now() + Duration::days(7));

        assert!(cookie.starts_with("refresh_token=abc.def.ghi; Path=/api/v1; Max-Age="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let cookie = policy(false).clear_refresh();
        assert_eq!(
            cookie,
            "refresh_token=; Path=/api/v1; Max-Age=0; HttpOnly; SameSite=Strict"
        );
    }
}
