//! Axum extractor that deserialises and validates query parameters

use crate::error::AnalyticsError;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// Conversion from raw query parameters into a validated value.
pub trait FromQuery: Sized {
    /// Raw query parameters, as deserialised from the query string.
    type Query: DeserializeOwned;

    /// Validate raw query parameters.
    fn from_query(query: Self::Query) -> Result<Self, AnalyticsError>;
}

/// An axum extractor based on the Query extractor that also performs validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: FromQuery + Send,
    T::Query: Send,
    S: Send + Sync,
{
    type Rejection = AnalyticsError;

    /// Extract a `ValidatedQuery` from request parts.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<T::Query>::from_request_parts(parts, state).await?;
        Ok(ValidatedQuery(T::from_query(query)?))
    }
}
