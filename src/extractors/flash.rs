//! Flash data carried by cookies across the post-action redirect.

use crate::config::CrudSettings;
use crate::service::{Crud, FieldErrors};
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderValue,
    },
    response::{IntoResponseParts, ResponseParts},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::convert::Infallible;

pub(crate) fn set_cookie(name: &str, value: &str, settings: &CrudSettings) -> String {
    format!(
        "{}={}; Path={}; Max-Age={}; SameSite=Lax; HttpOnly",
        name, value, settings.cookie_path, settings.flash_max_age_secs
    )
}

pub(crate) fn expire_cookie(name: &str, settings: &CrudSettings) -> String {
    format!("{}=; Path={}; Max-Age=0; SameSite=Lax; HttpOnly", name, settings.cookie_path)
}

pub(crate) fn encode_errors(errors: &FieldErrors) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(errors).unwrap_or_default())
}

pub(crate) fn decode_errors(raw: &str) -> Option<FieldErrors> {
    let bytes = URL_SAFE_NO_PAD.decode(raw.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|c| c.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim())
}

/// Flash left by the previous CRUD redirect. Return it from the handler to consume it.
///
/// ```rust,no_run
/// use axum::response::Html;
/// use easy_crud::Flash;
///
/// async fn index(flash: Flash) -> (Flash, Html<String>) {
///     let banner = if flash.is_confirmed() { "Saved." } else { "" };
///     (flash, Html(banner.to_string()))
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Flash {
    state: Option<String>,
    errors: FieldErrors,
    settings: CrudSettings,
    had_state: bool,
    had_errors: bool,
}

impl Flash {
    pub fn from_cookie_header(header: &str, settings: &CrudSettings) -> Self {
        let state = cookie_value(header, &settings.flash_key)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let raw_errors = cookie_value(header, &settings.errors_cookie).filter(|v| !v.is_empty());
        Self {
            had_state: state.is_some(),
            had_errors: raw_errors.is_some(),
            state,
            errors: raw_errors.and_then(decode_errors).unwrap_or_default(),
            settings: settings.clone(),
        }
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The last CRUD action succeeded.
    pub fn is_confirmed(&self) -> bool {
        self.state.as_deref() == Some(self.settings.flash_value.as_str())
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    Crud: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let crud = Crud::from_ref(state);
        let header = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");
        Ok(Flash::from_cookie_header(&header, crud.settings()))
    }
}

impl IntoResponseParts for Flash {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let mut expired = Vec::new();
        if self.had_state {
            expired.push(expire_cookie(&self.settings.flash_key, &self.settings));
        }
        if self.had_errors {
            expired.push(expire_cookie(&self.settings.errors_cookie, &self.settings));
        }
        for cookie in expired {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                res.headers_mut().append(SET_COOKIE, value);
            }
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_state_and_errors_from_cookies() {
        let settings = CrudSettings::default();
        let mut errors = FieldErrors::new();
        errors.add("name", "The name field is required.");
        let header = format!("theme=dark; state=confirmed; easy_crud_errors={}", encode_errors(&errors));

        let flash = Flash::from_cookie_header(&header, &settings);
        assert!(flash.is_confirmed());
        assert_eq!(flash.errors(), &errors);
    }

    #[test]
    fn garbage_error_cookie_is_ignored() {
        let flash = Flash::from_cookie_header("easy_crud_errors=%%%", &CrudSettings::default());
        assert!(!flash.has_errors());
        assert!(!flash.is_confirmed());
    }

    #[test]
    fn set_and_expire_cookie_shapes() {
        let settings = CrudSettings::default();
        assert_eq!(
            set_cookie("state", "confirmed", &settings),
            "state=confirmed; Path=/; Max-Age=60; SameSite=Lax; HttpOnly"
        );
        assert!(expire_cookie("state", &settings).contains("Max-Age=0"));
    }
}
