//! Data types and associated functions and methods

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::error::AnalyticsError;
use crate::types::{Interval, RecordId};
use crate::validated_query::FromQuery;

/// Datasets available to the API
///
/// Each dataset is a JSON array of records stored in its own file.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Dataset {
    /// [Sale] records
    Sales,
    /// [Customer] sign-up records
    Users,
    /// [CustomerLocation] records
    Customers,
}

/// A single sale
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Sale {
    /// Identifier of the sale
    pub sale_id: RecordId,
    /// Identifier of the purchasing customer
    pub user_id: RecordId,
    /// ISO 8601 date of the sale
    pub sale_date: String,
    /// Total price of the sale
    pub total_price: f64,
}

/// A customer sign-up
///
/// Other fields of the record, including its identifier, are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Customer {
    /// ISO 8601 date on which the customer was created
    pub created_at: String,
}

/// Where a customer lives
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CustomerLocation {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Total sales within one bucket
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotal {
    pub date: String,
    pub total_sales: f64,
}

/// Percentage change in total sales from the previous bucket
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesGrowth {
    pub date: String,
    pub growth_rate: f64,
}

/// One point of the sales-over-time series
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SalesPoint {
    Total(SalesTotal),
    Growth(SalesGrowth),
}

/// Number of customers created within one bucket
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomers {
    pub date: String,
    pub new_customers: usize,
}

/// Number of distinct customers that purchased within one bucket
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatCustomers {
    pub date: String,
    pub repeat_customers: usize,
}

/// Customers living in one city
///
/// The coordinates are those of the first customer seen for the city.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CityDistribution {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
}

/// Lifetime value of all cohorts within one month
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortValue {
    pub month: String,
    pub lifetime_value: f64,
}

/// Raw query parameters accepted by interval-aware endpoints
#[derive(Debug, Default, PartialEq)]
pub struct QueryParams {
    /// Interval name
    pub interval: Option<String>,
    /// Whether to return growth rates rather than totals
    pub growth: Option<String>,
}

impl QueryParams {
    /// Collect known parameters from decoded query string pairs.
    ///
    /// The first occurrence of a repeated parameter wins. Unknown parameters are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "interval" => &mut params.interval,
                "growth" => &mut params.growth,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// Parameters of an aggregation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AggregationParams {
    /// Interval over which records are bucketed
    pub interval: Interval,
    /// Whether to return period-over-period growth
    pub growth: bool,
}

impl AggregationParams {
    /// Return a new AggregationParams object.
    pub fn new(interval: Interval, growth: bool) -> Self {
        Self { interval, growth }
    }
}

impl TryFrom<QueryParams> for AggregationParams {
    type Error = AnalyticsError;

    /// An absent interval means daily. An empty one is rejected.
    fn try_from(query: QueryParams) -> Result<Self, Self::Error> {
        let interval = match query.interval {
            Some(name) => name.parse()?,
            None => Interval::default(),
        };
        let growth = query.growth.as_deref().map_or(false, is_truthy);
        Ok(Self { interval, growth })
    }
}

impl FromQuery for AggregationParams {
    type Query = Vec<(String, String)>;

    fn from_query(pairs: Vec<(String, String)>) -> Result<Self, AnalyticsError> {
        Self::try_from(QueryParams::from_pairs(pairs))
    }
}

/// Interpret a query flag value.
fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "0" | "no" | "off"
    )
}
