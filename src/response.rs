use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;

/// `{"success": true, "data": ...}` envelope used by every handler.
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn checked(self) -> Result<(i64, i64), ApiError> {
        if self.offset < 0 || self.limit < 0 {
            return Err(ApiError::Validation(
                "Error: offset and limit must not be negative".into(),
            ));
        }
        Ok((self.offset, self.limit))
    }
}

/// JSON body extractor whose rejections become `ApiError::Validation`.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let rejection: JsonRejection = rejection;
                warn!(error = %rejection.body_text(), "unable to parse json body");
                Err(ApiError::Validation("Error: Unable to parse json".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let json = serde_json::to_value(Success::new(vec![1, 2])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][1], 2);
    }

    #[test]
    fn pagination_rejects_negative_values() {
        let p = Pagination {
            offset: -1,
            limit: 20,
        };
        assert!(matches!(p.checked(), Err(ApiError::Validation(_))));

        let p = Pagination {
            offset: 40,
            limit: 20,
        };
        assert_eq!(p.checked().unwrap(), (40, 20));
    }
}
