//! pgopt Core - types shared by the driver and the command-line front end

pub mod config;
mod error;
pub mod explain;

pub use config::{
    DB_URL_ENV, DEFAULT_PORT, DatabaseConfig, PgoptConfig, SslMode, validate_postgres_url,
};
pub use error::{PgoptError, Result};
pub use explain::{ExplainExecutor, ExplainOptions};
