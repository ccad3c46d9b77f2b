use axum::{http::StatusCode, response::IntoResponse, Json};
use intake_protocol::ProblemDetails;

pub fn problem_response(
    status: StatusCode,
    title: &str,
    detail: Option<&str>,
) -> axum::response::Response {
    (
        status,
        Json(ProblemDetails {
            r#type: "about:blank".to_string(),
            title: title.to_string(),
            status: status.as_u16(),
            detail: detail.map(|d| d.to_string()),
        }),
    )
        .into_response()
}

pub fn bad_request(detail: &str) -> axum::response::Response {
    problem_response(StatusCode::BAD_REQUEST, "Bad Request", Some(detail))
}

pub fn internal_error() -> axum::response::Response {
    problem_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Error",
        Some("the turn could not be completed"),
    )
}
