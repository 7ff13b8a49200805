mod row;

mod value;
pub(crate) use value::Value;

use std::sync::Arc;

use postgres::tls::MakeTlsConnect;
use postgres::{types::ToSql, Socket};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_postgres::{Client, Config};
use tracing::warn;
use url::Url;

use latch_core::{
    async_trait,
    driver::{Handle, Row, Transaction},
    stmt, Error, Result,
};

/// The PostgreSQL database handle.
///
/// The client sits behind a mutex so a transaction can hold the connection
/// exclusively for its whole statement sequence.
#[derive(Debug)]
pub struct PostgreSQL {
    client: Arc<Mutex<Client>>,
}

impl PostgreSQL {
    /// Wraps an initialized connection.
    pub fn new(connection: Client) -> Self {
        Self {
            client: Arc::new(Mutex::new(connection)),
        }
    }

    /// Connects to a PostgreSQL database using a connection string.
    ///
    /// See [`postgres::Client::connect`] for more information.
    pub async fn connect(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(anyhow::Error::from)?;

        if url.scheme() != "postgresql" {
            return Err(anyhow::anyhow!(
                "connection URL does not have a `postgresql` scheme; url={}",
                url
            )
            .into());
        }

        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("missing host in connection URL; url={}", url))?;

        if url.path().is_empty() {
            return Err(anyhow::anyhow!(
                "no database specified - missing path in connection URL; url={}",
                url
            )
            .into());
        }

        let mut config = Config::new();
        config.host(host);
        config.dbname(url.path().trim_start_matches('/'));

        if let Some(port) = url.port() {
            config.port(port);
        }

        if !url.username().is_empty() {
            config.user(url.username());
        }

        if let Some(password) = url.password() {
            config.password(password);
        }

        Self::connect_with_config(config, tokio_postgres::NoTls).await
    }

    /// Connects to a PostgreSQL database using a [`postgres::Config`].
    ///
    /// See [`postgres::Client::configure`] for more information.
    pub async fn connect_with_config<T>(config: Config, tls: T) -> Result<Self>
    where
        T: MakeTlsConnect<Socket> + 'static,
        T::Stream: Send,
    {
        let (client, connection) = config.connect(tls).await.map_err(Error::driver)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "connection error");
            }
        });

        Ok(Self::new(client))
    }
}

impl From<Client> for PostgreSQL {
    fn from(client: Client) -> Self {
        Self::new(client)
    }
}

fn bind(args: &[stmt::Value]) -> Vec<Value> {
    args.iter().cloned().map(Value::from).collect()
}

async fn execute_on(client: &Client, sql: &str, args: &[stmt::Value]) -> Result<u64> {
    let params = bind(args);
    let refs = params
        .iter()
        .map(|param| param as &(dyn ToSql + Sync))
        .collect::<Vec<_>>();
    client.execute(sql, &refs).await.map_err(Error::driver)
}

#[async_trait]
impl Handle for PostgreSQL {
    async fn execute(&self, sql: &str, args: &[stmt::Value]) -> Result<u64> {
        let client = self.client.lock().await;
        execute_on(&client, sql, args).await
    }

    async fn query(&self, sql: &str, args: &[stmt::Value]) -> Result<Vec<Row>> {
        let client = self.client.lock().await;
        let params = bind(args);
        let refs = params
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect::<Vec<_>>();
        let rows = client.query(sql, &refs).await.map_err(Error::driver)?;
        rows.iter().map(row::materialize).collect()
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let client = self.client.clone().lock_owned().await;
        client.batch_execute("BEGIN").await.map_err(Error::driver)?;
        Ok(Box::new(PgTransaction {
            client: Some(client),
        }))
    }
}

/// An open transaction holding the connection lock. The lock is released
/// when the transaction resolves, so statements from other tasks cannot
/// interleave with the transaction's own.
struct PgTransaction {
    client: Option<OwnedMutexGuard<Client>>,
}

impl PgTransaction {
    fn client(&self) -> Result<&Client> {
        match &self.client {
            Some(client) => Ok(&**client),
            None => Err(anyhow::anyhow!("transaction already resolved").into()),
        }
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    async fn execute(&self, sql: &str, args: &[stmt::Value]) -> Result<u64> {
        execute_on(self.client()?, sql, args).await
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        client.batch_execute("COMMIT").await.map_err(Error::driver)
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        client.batch_execute("ROLLBACK").await.map_err(Error::driver)
    }
}

impl Drop for PgTransaction {
    fn drop(&mut self) {
        // A transaction dropped without resolving (early return, panic)
        // must not leave the connection mid-transaction.
        if let Some(client) = self.client.take() {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(async move {
                    if let Err(err) = client.batch_execute("ROLLBACK").await {
                        warn!(error = %err, "rollback on drop failed");
                    }
                });
            }
        }
    }
}
