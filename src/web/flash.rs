//! One-shot notices carried to the next page in a cookie.

use tower_cookies::{Cookie, Cookies};

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// Cookie-safe encoding: `<kind>:<percent-encoded message>`
    fn encode(&self) -> String {
        format!("{}:{}", self.kind.as_str(), urlencoding::encode(&self.message))
    }

    fn decode(value: &str) -> Option<Self> {
        let (kind, message) = value.split_once(':')?;
        let kind = match kind {
            "success" => FlashKind::Success,
            "error" => FlashKind::Error,
            _ => return None,
        };
        let message = urlencoding::decode(message).ok()?.into_owned();
        Some(Self { kind, message })
    }
}

/// Queue a notice for the next rendered page
pub fn push(cookies: &Cookies, flash: Flash) {
    let mut cookie = Cookie::new(FLASH_COOKIE, flash.encode());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);
}

/// Take the pending notice, if any, clearing it
pub fn take(cookies: &Cookies) -> Option<Flash> {
    let value = cookies.get(FLASH_COOKIE)?.value().to_string();

    let mut cookie = Cookie::new(FLASH_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);

    Flash::decode(&value)
}
