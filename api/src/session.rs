//! Token delivery to the client
//!
//! A token pair leaves the server either as a JSON body or as two cookies.
//! Cookies are `HttpOnly`, `Secure`, `SameSite=None` and scoped to `/`, and
//! expire together with the token they carry.

use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};

use ks_core::domain::entities::token::TokenPair;

use crate::dto::{AuthenticationResponse, RefreshTokenRequest};

/// Cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "__Secure-ACCESS-TOKEN";

/// Cookie carrying the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "__Secure-REFRESH-TOKEN";

/// Hand a freshly issued pair to the client
///
/// With `use_cookies` the body is empty and both tokens travel as cookies,
/// otherwise they are returned as JSON.
pub fn deliver(pair: TokenPair, use_cookies: bool) -> HttpResponse {
    if !use_cookies {
        return HttpResponse::Ok().json(AuthenticationResponse::from(pair));
    }

    let access = token_cookie(
        ACCESS_TOKEN_COOKIE,
        pair.access_token,
        pair.access_token_expires_in,
        pair.access_token_expires_at,
    );
    let refresh = token_cookie(
        REFRESH_TOKEN_COOKIE,
        pair.refresh_token,
        pair.refresh_token_expires_in,
        pair.refresh_token_expires_at,
    );

    HttpResponse::Ok().cookie(access).cookie(refresh).finish()
}

fn token_cookie(
    name: &'static str,
    value: String,
    expires_in: i64,
    expires_at: DateTime<Utc>,
) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(CookieDuration::seconds(expires_in))
        .finish();

    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        cookie.set_expires(expires);
    }

    cookie
}

/// Cookie that makes the browser drop `name`
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(CookieDuration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .finish()
}

/// Attach removal cookies for both tokens
pub fn clear_session_cookies(response: &mut HttpResponse) {
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        if let Err(e) = response.add_cookie(&removal_cookie(name)) {
            tracing::warn!(error = %e, cookie = name, "Failed to attach removal cookie");
        }
    }
}

/// Refresh token from the request body, falling back to the cookie
pub fn refresh_token_from(req: &HttpRequest, body: Option<RefreshTokenRequest>) -> Option<String> {
    body.and_then(|b| b.refresh_token)
        .filter(|token| !token.is_empty())
        .or_else(|| {
            req.cookie(REFRESH_TOKEN_COOKIE)
                .map(|c| c.value().to_string())
                .filter(|token| !token.is_empty())
        })
}
