//! PostgreSQL executor for pgopt
//!
//! Connects with tokio-postgres and runs `EXPLAIN (..., FORMAT JSON)` inside a
//! transaction that is always rolled back.

mod connection;
mod tls;

pub use connection::{PostgresConnector, format_postgres_error};
pub use tls::{TlsError, build_tls_connector, pg_ssl_mode};
