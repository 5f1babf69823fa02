//! Allow-all CORS
//!
//! Any origin, any method and any request header are accepted, with
//! credentials. The request origin is echoed back, since browsers refuse a
//! literal `*` on credentialed responses. Preflights are answered before
//! routing, so they succeed for every path.

use warp::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, VARY,
};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

pub const ALLOWED_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const PREFLIGHT_MAX_AGE_SECS: &str = "600";

/// Matches `OPTIONS` requests carrying `Access-Control-Request-Method`
pub fn preflight() -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::options()
        .and(warp::header::<String>("access-control-request-method"))
        .and(warp::header::optional::<String>("origin"))
        .and(warp::header::optional::<String>("access-control-request-headers"))
        .map(|_method: String, origin: Option<String>, requested: Option<String>| {
            preflight_response(origin.as_deref(), requested.as_deref())
        })
}

fn preflight_response(origin: Option<&str>, requested_headers: Option<&str>) -> Response {
    let mut response = warp::reply::with_status(warp::reply(), StatusCode::OK).into_response();
    let headers = response.headers_mut();

    match origin {
        Some(origin) => allow_origin(headers, origin),
        None => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        }
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    if let Some(value) = requested_headers.and_then(|h| HeaderValue::from_str(h).ok()) {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, value);
    }
    headers.insert(
        ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECS),
    );

    response
}

/// Add the allow-origin headers to an ordinary response
pub fn with_cors_headers(origin: Option<String>, reply: impl Reply) -> Response {
    let mut response = reply.into_response();
    if let Some(origin) = origin {
        allow_origin(response.headers_mut(), &origin);
    }
    response
}

fn allow_origin(headers: &mut HeaderMap, origin: &str) {
    // A malformed Origin gets no CORS headers at all
    let Ok(value) = HeaderValue::from_str(origin) else {
        return;
    };
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));
}
