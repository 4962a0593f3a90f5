//! Request body extraction with validation

use crate::error::ApiError;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use bookshelf_core::Validate;
use serde::de::DeserializeOwned;

/// JSON body that has passed [`Validate`]. Parse and validation failures both
/// become the 400 failure envelope.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}
