use crate::error::AnalyticsError;
use crate::models::{AggregationParams, Dataset};

use serde::{de::DeserializeOwned, Serialize};

/// Trait for analytics aggregations.
///
/// This forms the contract between the API layer and aggregations. An aggregation reduces all
/// records of one dataset to a series of rows.
pub trait Aggregation: 'static {
    /// Dataset the records are loaded from.
    const DATASET: Dataset;

    /// Record type consumed by the aggregation.
    type Record: DeserializeOwned + Send + Sync;

    /// Row type produced by the aggregation.
    type Row: Serialize + Send;

    /// Execute the aggregation.
    ///
    /// Returns the rows of the resulting series.
    ///
    /// # Arguments
    ///
    /// * `records`: All records of the dataset
    /// * `params`: Interval and flags of the request
    fn execute(
        records: &[Self::Record],
        params: &AggregationParams,
    ) -> Result<Vec<Self::Row>, AnalyticsError>;
}
