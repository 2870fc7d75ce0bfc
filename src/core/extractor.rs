//! JSON body extraction for dashboard forms.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::core::error::AppError;

/// JSON body that is deserialized and then validated.
///
/// Malformed bodies are a `BadRequest`; bodies failing their `validator`
/// rules are a `Validation` error, both in the shared envelope.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        value
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(Self(value))
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
        JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        _ => "Failed to parse JSON body".to_string(),
    };
    AppError::BadRequest(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Router};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Deserialize, Validate)]
    struct TitleForm {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
    }

    async fn echo(AppJson(form): AppJson<TitleForm>) -> String {
        form.title
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/", post(echo))).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let response = server().post("/").json(&json!({ "title": "President" })).await;
        response.assert_status_ok();
        response.assert_text("President");
    }

    #[tokio::test]
    async fn test_failed_rules_are_validation_errors() {
        let response = server().post("/").json(&json!({ "title": "" })).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["errors"][0].as_str().unwrap().contains("Title is required"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let response = server()
            .post("/")
            .bytes("{\"title\":".into())
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON syntax"));
    }
}
