//! Command Line Interface (CLI) arguments.

use std::path::PathBuf;

use clap::Parser;

/// Sales analytics command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "SALES_ANALYTICS_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 8080, env = "SALES_ANALYTICS_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "SALES_ANALYTICS_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/sales-analytics/certs/cert.pem",
        env = "SALES_ANALYTICS_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/sales-analytics/certs/key.pem",
        env = "SALES_ANALYTICS_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for requests to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "SALES_ANALYTICS_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Directory containing the dataset files
    #[arg(long, default_value = "data", env = "SALES_ANALYTICS_DATA_DIR")]
    pub data_dir: PathBuf,
    /// Sales dataset file, relative to the data directory
    #[arg(long, default_value = "sales.json", env = "SALES_ANALYTICS_SALES_FILE")]
    pub sales_file: PathBuf,
    /// Users dataset file, relative to the data directory
    #[arg(long, default_value = "users.json", env = "SALES_ANALYTICS_USERS_FILE")]
    pub users_file: PathBuf,
    /// Customers dataset file, relative to the data directory
    #[arg(
        long,
        default_value = "customers.json",
        env = "SALES_ANALYTICS_CUSTOMERS_FILE"
    )]
    pub customers_file: PathBuf,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
