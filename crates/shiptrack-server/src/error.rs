use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shiptrack_core::TrackError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 400 Bad Request errors
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 400 through
/// the `anyhow::Error` chain without touching the `TrackError` enum.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<TrackError>() {
            match e {
                TrackError::NotInitialized => StatusCode::BAD_REQUEST,
                TrackError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                TrackError::OrderExists(_)
                | TrackError::AlreadyDispatched(_)
                | TrackError::JobAlreadyRunning => StatusCode::CONFLICT,
                TrackError::InvalidOrderId(_)
                | TrackError::InvalidTrackingReference(_)
                | TrackError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
                TrackError::TerminalOrder { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                TrackError::CarrierTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                TrackError::CarrierUnavailable(_) | TrackError::CarrierRejected(_) => {
                    StatusCode::BAD_GATEWAY
                }
                TrackError::Store(_)
                | TrackError::Io(_)
                | TrackError::Yaml(_)
                | TrackError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_not_found_maps_to_404() {
        let err = AppError(TrackError::OrderNotFound("abc".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn job_already_running_maps_to_409() {
        let err = AppError(TrackError::JobAlreadyRunning.into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn already_dispatched_maps_to_409() {
        let err = AppError(TrackError::AlreadyDispatched("AUR-1001".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_reference_maps_to_400() {
        let err = AppError(TrackError::InvalidTrackingReference("x".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn terminal_order_maps_to_422() {
        let err = AppError(
            TrackError::TerminalOrder {
                order: "AUR-1001".into(),
                status: "cancelled".into(),
            }
            .into(),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn carrier_timeout_maps_to_504() {
        let err = AppError(TrackError::CarrierTimeout("SR1: deadline".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn carrier_unavailable_maps_to_502() {
        let err = AppError(TrackError::CarrierUnavailable("SR1: refused".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn store_error_maps_to_500() {
        let err = AppError(TrackError::Store("corrupted".into()).into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_initialized_maps_to_400() {
        let err = AppError(TrackError::NotInitialized.into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        let err = AppError::bad_request("weight_grams must be positive");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn non_track_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_is_json_error_object() {
        let err = AppError(TrackError::OrderNotFound("abc".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
