use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// JSON body that must be an object; arrays and scalars are rejected before
/// any field mapping happens.
pub struct JsonObject<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonObject<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        if !value.is_object() {
            return Err(ApiError::MalformedBody(
                "Request body must be a JSON object".into(),
            ));
        }
        serde_json::from_value(value)
            .map(JsonObject)
            .map_err(|e| ApiError::MalformedBody(format!("Invalid request body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Pair {
        #[serde(default)]
        a: Option<String>,
        #[serde(default)]
        b: Option<String>,
    }

    fn request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_objects() {
        let JsonObject(pair) = JsonObject::<Pair>::from_request(request(r#"{"a":"x"}"#), &())
            .await
            .expect("object");
        assert_eq!(pair.a.as_deref(), Some("x"));
        assert_eq!(pair.b, None);
    }

    #[tokio::test]
    async fn rejects_positional_arrays() {
        let err = JsonObject::<Pair>::from_request(request(r#"["x","y"]"#), &())
            .await
            .err()
            .expect("array rejected");
        assert!(matches!(err, ApiError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn rejects_scalars_and_wrong_field_types() {
        for body in [r#""x""#, "42", r#"{"a": 5}"#] {
            let err = JsonObject::<Pair>::from_request(request(body), &())
                .await
                .err()
                .expect("rejected");
            assert!(matches!(err, ApiError::MalformedBody(_)), "{body}");
        }
    }
}
