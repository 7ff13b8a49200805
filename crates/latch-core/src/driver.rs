use crate::{async_trait, stmt::Value, Result};

/// A materialized result row: column names paired with decoded values, in
/// projection order. Drivers produce these; [`crate::schema::Record`]
/// materializes typed records from them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Returns the value of the first column with the given name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// A live database handle: executes SQL text with positional arguments.
///
/// The handle is assumed safe for concurrent use; the adapter holds no
/// state beyond its table bindings and performs no locking of its own.
#[async_trait]
pub trait Handle: Send + Sync {
    /// Executes a statement, returning the number of affected rows.
    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64>;

    /// Executes a statement, returning the matching rows in database order.
    async fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>>;

    /// Opens a transaction.
    async fn begin(&self) -> Result<Box<dyn Transaction>>;
}

/// An open transaction. Dropping a transaction that was neither committed
/// nor rolled back must roll it back.
#[async_trait]
pub trait Transaction: Send {
    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}
