//! Analytics aggregations.
//!
//! Each aggregation is implemented as a struct that implements the
//! [Aggregation](crate::operation::Aggregation) trait. Time series are keyed by
//! [Interval](crate::types::Interval) bucket and sorted by key.

use std::collections::BTreeMap;

use crate::error::AnalyticsError;
use crate::models::{
    AggregationParams, CityDistribution, CohortValue, Customer, CustomerLocation, Dataset,
    NewCustomers, RepeatCustomers, Sale, SalesGrowth, SalesPoint, SalesTotal,
};
use crate::operation::Aggregation;
use crate::types::{Interval, RecordId};

use hashbrown::{HashMap, HashSet};

/// Sum sale prices per bucket.
fn sales_totals(sales: &[Sale], interval: Interval) -> Result<Vec<SalesTotal>, AnalyticsError> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for sale in sales {
        let bucket = interval.bucket(&sale.sale_date)?;
        *totals.entry(bucket).or_default() += sale.total_price;
    }
    Ok(totals
        .into_iter()
        .map(|(date, total_sales)| SalesTotal { date, total_sales })
        .collect())
}

/// Convert a sorted series of totals into period-over-period growth percentages.
///
/// The first bucket has no predecessor and is dropped. Growth from a zero total is reported as
/// zero rather than infinity.
pub fn growth_rates(totals: &[SalesTotal]) -> Vec<SalesGrowth> {
    totals
        .windows(2)
        .map(|pair| {
            let (previous, current) = (pair[0].total_sales, pair[1].total_sales);
            let growth_rate = if previous != 0.0 {
                (current - previous) / previous * 100.0
            } else {
                0.0
            };
            SalesGrowth {
                date: pair[1].date.clone(),
                growth_rate,
            }
        })
        .collect()
}

/// Return total sales per bucket, or their growth.
pub struct SalesOverTime {}

impl Aggregation for SalesOverTime {
    const DATASET: Dataset = Dataset::Sales;
    type Record = Sale;
    type Row = SalesPoint;

    fn execute(
        records: &[Sale],
        params: &AggregationParams,
    ) -> Result<Vec<SalesPoint>, AnalyticsError> {
        let totals = sales_totals(records, params.interval)?;
        let series = if params.growth {
            growth_rates(&totals)
                .into_iter()
                .map(SalesPoint::Growth)
                .collect()
        } else {
            totals.into_iter().map(SalesPoint::Total).collect()
        };
        Ok(series)
    }
}

/// Return the number of customers created per bucket.
pub struct NewCustomersOverTime {}

impl Aggregation for NewCustomersOverTime {
    const DATASET: Dataset = Dataset::Users;
    type Record = Customer;
    type Row = NewCustomers;

    fn execute(
        records: &[Customer],
        params: &AggregationParams,
    ) -> Result<Vec<NewCustomers>, AnalyticsError> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for customer in records {
            let bucket = params.interval.bucket(&customer.created_at)?;
            *counts.entry(bucket).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(date, new_customers)| NewCustomers {
                date,
                new_customers,
            })
            .collect())
    }
}

/// Return the number of distinct customers that purchased in each bucket.
///
/// Every customer counts towards each bucket they purchased in, at most once per bucket. This
/// measures active customers per period; the customer need not have bought before.
pub struct RepeatCustomersOverTime {}

impl Aggregation for RepeatCustomersOverTime {
    const DATASET: Dataset = Dataset::Sales;
    type Record = Sale;
    type Row = RepeatCustomers;

    fn execute(
        records: &[Sale],
        params: &AggregationParams,
    ) -> Result<Vec<RepeatCustomers>, AnalyticsError> {
        let mut customers: BTreeMap<String, HashSet<&RecordId>> = BTreeMap::new();
        for sale in records {
            let bucket = params.interval.bucket(&sale.sale_date)?;
            customers.entry(bucket).or_default().insert(&sale.user_id);
        }
        Ok(customers
            .into_iter()
            .map(|(date, customers)| RepeatCustomers {
                date,
                repeat_customers: customers.len(),
            })
            .collect())
    }
}

/// Return the number of customers per city.
///
/// Cities appear in the order they are first seen, with the coordinates of their first customer.
pub struct CustomerDistribution {}

impl Aggregation for CustomerDistribution {
    const DATASET: Dataset = Dataset::Customers;
    type Record = CustomerLocation;
    type Row = CityDistribution;

    fn execute(
        records: &[CustomerLocation],
        _params: &AggregationParams,
    ) -> Result<Vec<CityDistribution>, AnalyticsError> {
        let mut cities: Vec<CityDistribution> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for customer in records {
            match index.get(customer.city.as_str()) {
                Some(&position) => cities[position].count += 1,
                None => {
                    index.insert(&customer.city, cities.len());
                    cities.push(CityDistribution {
                        city: customer.city.clone(),
                        latitude: customer.latitude,
                        longitude: customer.longitude,
                        count: 1,
                    });
                }
            }
        }
        Ok(cities)
    }
}

/// Return customer lifetime value per month, summed over cohorts.
///
/// Cohorts are keyed by `sale_id`, so each cohort holds a single sale and the result equals the
/// total sales per month. Cohorts are summed in the order they are first seen, which keeps the
/// floating point totals identical to summing the sales of each month directly.
pub struct ClvByCohorts {}

impl Aggregation for ClvByCohorts {
    const DATASET: Dataset = Dataset::Sales;
    type Record = Sale;
    type Row = CohortValue;

    fn execute(
        records: &[Sale],
        _params: &AggregationParams,
    ) -> Result<Vec<CohortValue>, AnalyticsError> {
        let mut cohorts: Vec<BTreeMap<String, f64>> = Vec::new();
        let mut index: HashMap<&RecordId, usize> = HashMap::new();
        for sale in records {
            let month = Interval::Monthly.bucket(&sale.sale_date)?;
            let position = *index.entry(&sale.sale_id).or_insert_with(|| {
                cohorts.push(BTreeMap::new());
                cohorts.len() - 1
            });
            *cohorts[position].entry(month).or_default() += sale.total_price;
        }

        let mut months: BTreeMap<String, f64> = BTreeMap::new();
        for (month, value) in cohorts.into_iter().flatten() {
            *months.entry(month).or_default() += value;
        }
        Ok(months
            .into_iter()
            .map(|(month, lifetime_value)| CohortValue {
                month,
                lifetime_value,
            })
            .collect())
    }
}
