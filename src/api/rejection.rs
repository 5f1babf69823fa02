//! Turns warp rejections into `{"detail": ...}` bodies

use crate::error::{ErrorBody, TriageError};
use std::convert::Infallible;
use tracing::{debug, error};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

pub fn detail_response(status: StatusCode, detail: impl Into<String>) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            detail: detail.into(),
        }),
        status,
    )
    .into_response()
}

/// Response for a failed operation. 5xx errors are logged here.
pub fn error_response(err: &TriageError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        error!(status = status.as_u16(), error = %err, "Request failed");
    } else {
        debug!(status = status.as_u16(), error = %err, "Request rejected");
    }
    warp::reply::with_status(warp::reply::json(&err.to_error_body()), status).into_response()
}

pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(detail_response(StatusCode::NOT_FOUND, "Not Found"));
    }

    if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        return Ok(error_response(&TriageError::invalid_input(e.to_string())));
    }

    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(detail_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        ));
    }

    if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(detail_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected application/json",
        ));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(detail_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed",
        ));
    }

    error!("Unhandled rejection: {:?}", err);
    Ok(detail_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
    ))
}
