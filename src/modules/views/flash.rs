//! One-shot notices carried across a redirect in a cookie.

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

pub const FLASH_COOKIE: &str = "shelf_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Danger => "danger",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Level::Success),
            "info" => Some(Level::Info),
            "warning" => Some(Level::Warning),
            "danger" => Some(Level::Danger),
            _ => None,
        }
    }
}

/// A message shown once to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(Level::Danger, message)
    }

    fn cookie_value(&self) -> String {
        format!(
            "{}|{}",
            self.level.as_str(),
            utf8_percent_encode(&self.message, NON_ALPHANUMERIC)
        )
    }

    fn from_cookie_value(value: &str) -> Option<Self> {
        let (level, message) = value.split_once('|')?;
        let message = percent_decode_str(message).decode_utf8().ok()?;
        Some(Self::new(Level::parse(level)?, message))
    }
}

/// Redirects to `to` (303) leaving `notice` for the next rendered page.
pub fn redirect_with(to: &str, notice: Notice) -> Response {
    let cookie = format!(
        "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        notice.cookie_value()
    );
    let mut response = Redirect::to(to).into_response();
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(err) => tracing::warn!(error = %err, "dropping notice that is not a valid header"),
    }
    response
}

/// Reads the pending notice from the request cookies, if any.
pub fn pending(headers: &HeaderMap) -> Option<Notice> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .and_then(|(_, value)| Notice::from_cookie_value(value))
}

/// `Set-Cookie` value that discards the pending notice.
pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("shelf_flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
