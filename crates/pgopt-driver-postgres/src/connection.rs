//! PostgreSQL connection implementation

use crate::tls::{build_tls_connector, pg_ssl_mode};
use async_trait::async_trait;
use pgopt_core::{DatabaseConfig, ExplainExecutor, ExplainOptions, PgoptError, Result, SslMode};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::tls::MakeTlsConnect;
use tokio_postgres::{Client, NoTls, Socket};

const APPLICATION_NAME: &str = "pgopt";

/// Renders a server error with its detail, hint and SQLSTATE
pub fn format_postgres_error(error: &tokio_postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let code = db_error.code();
    let mut message = db_error.message().to_string();

    if let Some(detail) = db_error.detail() {
        if !detail.trim().is_empty() {
            message.push_str(&format!(" (detail: {})", detail));
        }
    }

    if let Some(hint) = db_error.hint() {
        if !hint.trim().is_empty() {
            message.push_str(&format!(" (hint: {})", hint));
        }
    }

    match code.code() {
        "42601" => format!("syntax error: {}", message),
        "42P01" => format!("undefined table: {}", message),
        "57014" => format!("statement cancelled: {}", message),
        _ => format!("{} (code: {})", message, code.code()),
    }
}

/// A single PostgreSQL connection that runs EXPLAIN
pub struct PostgresConnector {
    client: Arc<Mutex<Client>>,
    statement_timeout_ms: Option<u64>,
}

impl PostgresConnector {
    /// Connect using a validated database config
    #[tracing::instrument(skip(config))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;
        let (pg_config, ssl_mode) = pg_config(config)?;

        let host = config.parsed_url()?.host_str().unwrap_or_default().to_string();
        let port = config.port()?;
        tracing::info!(
            host = %host,
            port = %port,
            ssl_mode = %ssl_mode,
            "connecting to PostgreSQL database"
        );

        let client = if ssl_mode == SslMode::Disable {
            connect_with(&pg_config, NoTls).await?
        } else {
            let tls = build_tls_connector(ssl_mode)
                .map_err(|e| PgoptError::Connection(e.to_string()))?;
            connect_with(&pg_config, tls).await?
        };

        tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

        Ok(Self {
            client: Arc::new(Mutex::new(client)),
            statement_timeout_ms: config.statement_timeout_ms,
        })
    }

    /// Round-trips a trivial query
    #[tracing::instrument(skip(self))]
    pub async fn ping(&self) -> Result<()> {
        let client = self.client.lock().await;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| PgoptError::Connection(format_postgres_error(&e)))?;
        Ok(())
    }
}

#[async_trait]
impl ExplainExecutor for PostgresConnector {
    #[tracing::instrument(skip(self, query, options), fields(analyze = options.analyze))]
    async fn explain(&self, query: &str, options: &ExplainOptions) -> Result<String> {
        if query.trim().is_empty() {
            return Err(PgoptError::Query("Query is empty".to_string()));
        }

        let statement = options.statement(query);
        tracing::debug!(statement = %statement, "running EXPLAIN");

        let mut client = self.client.lock().await;
        let transaction = client.transaction().await.map_err(|e| {
            PgoptError::Query(format!(
                "Failed to start transaction: {}",
                format_postgres_error(&e)
            ))
        })?;

        if let Some(timeout_ms) = self.statement_timeout_ms {
            transaction
                .batch_execute(&format!("SET LOCAL statement_timeout = {}", timeout_ms))
                .await
                .map_err(|e| PgoptError::Query(format_postgres_error(&e)))?;
        }

        let outcome = transaction.query_one(statement.as_str(), &[]).await;

        // ANALYZE really executes the statement, so nothing it did may persist
        if let Err(e) = transaction.rollback().await {
            tracing::warn!(error = %e, "rollback after EXPLAIN failed");
        }

        let row = outcome.map_err(|e| PgoptError::Query(format_postgres_error(&e)))?;
        let plan: serde_json::Value = row
            .try_get(0)
            .map_err(|e| PgoptError::Query(format!("Unexpected EXPLAIN output: {}", e)))?;

        Ok(plan.to_string())
    }
}

/// Builds the tokio-postgres config from the connection URL.
///
/// The query string is dropped: `sslmode` is applied separately because
/// tokio-postgres rejects `allow`, `verify-ca` and `verify-full`.
fn pg_config(config: &DatabaseConfig) -> Result<(tokio_postgres::Config, SslMode)> {
    let ssl_mode = config.ssl_mode()?;
    let mut url = config.parsed_url()?;
    url.set_query(None);

    let mut pg_config: tokio_postgres::Config = url
        .as_str()
        .parse()
        .map_err(|e| PgoptError::Configuration(format!("Invalid database URL: {}", e)))?;

    if url.port().is_none() {
        pg_config.port(pgopt_core::DEFAULT_PORT);
    }
    pg_config
        .ssl_mode(pg_ssl_mode(ssl_mode))
        .application_name(APPLICATION_NAME);

    Ok((pg_config, ssl_mode))
}

async fn connect_with<T>(pg_config: &tokio_postgres::Config, tls: T) -> Result<Client>
where
    T: MakeTlsConnect<Socket>,
    T::Stream: Send + 'static,
{
    let (client, connection) = pg_config.connect(tls).await.map_err(|e| {
        PgoptError::Connection(format!(
            "Failed to connect to PostgreSQL: {}",
            format_postgres_error(&e)
        ))
    })?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "PostgreSQL connection error");
        }
    });

    Ok(client)
}
