//! Owner session cookie.
//!
//! The editor hands its access token to `POST /api/v1/session`, which sets
//! an httpOnly cookie. Browsers then send it when the owner opens the public
//! link, so the page can offer the way back to the editor. The cookie only
//! identifies the viewer on public pages; owner routes still require a
//! Bearer token.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use crate::config::CookieConfig;

#[derive(Debug, Clone)]
pub struct CookieHelper {
    config: CookieConfig,
}

impl CookieHelper {
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Set-Cookie value carrying the owner token.
    pub fn build_session_cookie(&self, token: &str) -> String {
        self.build_cookie(token, self.config.max_age_secs)
    }

    /// Set-Cookie value that expires the owner cookie.
    pub fn build_clear_cookie(&self) -> String {
        let mut cookie = self.build_cookie("", 0);
        cookie.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        cookie
    }

    /// Appends the session cookie. No-op when cookies are disabled.
    pub fn add_session_cookie(&self, headers: &mut HeaderMap, token: &str) {
        if !self.config.enabled {
            return;
        }
        if let Ok(value) = HeaderValue::from_str(&self.build_session_cookie(token)) {
            headers.append(SET_COOKIE, value);
        }
    }

    pub fn add_clear_cookie(&self, headers: &mut HeaderMap) {
        if !self.config.enabled {
            return;
        }
        if let Ok(value) = HeaderValue::from_str(&self.build_clear_cookie()) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Owner token from the request cookies, if cookies are enabled.
    pub fn session_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        if !self.config.enabled {
            return None;
        }
        extract_cookie(headers, &self.config.name).filter(|v| !v.is_empty())
    }

    fn build_cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; HttpOnly",
            self.config.name, value, self.config.path, max_age
        );
        if self.config.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.config.same_site));
        if !self.config.domain.is_empty() {
            cookie.push_str(&format!("; Domain={}", self.config.domain));
        }
        cookie
    }
}

/// Value of cookie `name`, across every Cookie header of the request.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
}
