//! 요청 본문 추출기.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// JSON 역직렬화 후 `validator` 검증까지 수행하는 추출기.
///
/// 본문이 JSON이 아니거나 필드가 없거나 검증에 실패하면 400 `invalid_request`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::invalid_request(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| ApiError::invalid_request(validation_message(&errors)))?;

        Ok(Self(value))
    }
}

/// 필드별 검증 에러를 한 줄 메시지로 합침.
pub fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}
