//! Loading of datasets from local JSON files.

use crate::cli::CommandLineArgs;
use crate::error::AnalyticsError;
use crate::metrics::{MISSING_DATASETS, RECORDS_LOADED};
use crate::models::Dataset;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

/// Location of the dataset files.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    /// Directory containing the dataset files
    pub data_dir: PathBuf,
    /// Sales dataset file name, relative to `data_dir`
    pub sales_file: PathBuf,
    /// Users dataset file name, relative to `data_dir`
    pub users_file: PathBuf,
    /// Customers dataset file name, relative to `data_dir`
    pub customers_file: PathBuf,
}

impl StoreConfig {
    /// Return a StoreConfig using the default file names within a directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sales_file: "sales.json".into(),
            users_file: "users.json".into(),
            customers_file: "customers.json".into(),
        }
    }
}

impl From<&CommandLineArgs> for StoreConfig {
    fn from(args: &CommandLineArgs) -> Self {
        Self {
            data_dir: args.data_dir.clone(),
            sales_file: args.sales_file.clone(),
            users_file: args.users_file.clone(),
            customers_file: args.customers_file.clone(),
        }
    }
}

/// Read-only store of records.
///
/// Datasets are read from disk on every load. Nothing is cached between requests.
#[derive(Debug)]
pub struct RecordStore {
    config: StoreConfig,
}

impl RecordStore {
    /// Initialise the record store.
    ///
    /// # Arguments
    ///
    /// * `config`: Location of the dataset files
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Returns the path of a dataset file.
    pub fn path(&self, dataset: Dataset) -> PathBuf {
        let file: &Path = match dataset {
            Dataset::Sales => &self.config.sales_file,
            Dataset::Users => &self.config.users_file,
            Dataset::Customers => &self.config.customers_file,
        };
        self.config.data_dir.join(file)
    }

    /// Load all records of a dataset.
    ///
    /// Returns an empty list if the dataset file does not exist.
    ///
    /// # Arguments
    ///
    /// * `dataset`: Dataset to load
    #[tracing::instrument(level = "DEBUG", skip(self))]
    pub async fn load<T: DeserializeOwned>(
        &self,
        dataset: Dataset,
    ) -> Result<Vec<T>, AnalyticsError> {
        let path = self.path(dataset);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} not found, treating as empty", path.display());
                MISSING_DATASETS
                    .with_label_values(&[&dataset.to_string()])
                    .inc();
                return Ok(Vec::new());
            }
            Err(source) => return Err(AnalyticsError::DatasetRead { dataset, source }),
        };
        let records: Vec<T> = serde_json::from_slice(&data)
            .map_err(|source| AnalyticsError::DatasetFormat { dataset, source })?;
        tracing::debug!("loaded {} records", records.len());
        RECORDS_LOADED
            .with_label_values(&[&dataset.to_string()])
            .inc_by(records.len() as u64);
        Ok(records)
    }
}
