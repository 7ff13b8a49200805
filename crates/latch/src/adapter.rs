use crate::TableSet;

use latch_core::{
    driver::{Handle, Row, Transaction},
    schema::{KeyRecord, Record, SessionRecord, UserJoinSession, UserRecord},
    stmt::UpdateSet,
    Result,
};
use latch_sql::{escape, Fields, Flavor, Serializer, Statement};
use tracing::{debug, warn};

/// The persistence adapter consumed by the authentication core.
///
/// Owns the database handle and the table bindings for its lifetime. All
/// operations are single synchronous round trips against the handle, except
/// the keyed [`set_user`](Adapter::set_user) write, which runs a fixed
/// two-statement sequence inside one transaction. The adapter itself holds
/// no mutable state and performs no locking; conflicting concurrent writes
/// are resolved by the store's own constraints.
#[derive(Debug)]
pub struct Adapter<H> {
    handle: H,
    tables: TableSet,
    serializer: Serializer,
}

impl<H: Handle> Adapter<H> {
    pub fn new(handle: H, tables: TableSet) -> Adapter<H> {
        Adapter::with_flavor(handle, tables, Flavor::Postgresql)
    }

    /// Builds an adapter targeting a different placeholder syntax.
    pub fn with_flavor(handle: H, tables: TableSet, flavor: Flavor) -> Adapter<H> {
        Adapter {
            handle,
            tables,
            serializer: Serializer::new(flavor),
        }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    // --- users

    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        self.select_first(self.tables.user(), "id", user_id).await
    }

    /// Creates a user, optionally together with its first key.
    ///
    /// Without a key this is a single INSERT. With one, both INSERTs run in
    /// a transaction: the user row first, then the key row, committed only
    /// if both succeeded. Dynamic attributes merge into the user INSERT on
    /// both paths.
    pub async fn set_user(&self, user: &UserRecord, key: Option<&KeyRecord>) -> Result<()> {
        let user_fields = Fields::from_record_with_attributes(user)?;

        let Some(key) = key else {
            return self.insert(self.tables.user(), user_fields).await;
        };
        let key_fields = Fields::from_record_with_attributes(key)?;

        let tx = self.handle.begin().await?;
        let inserts = async {
            self.insert_in(&*tx, self.tables.user(), user_fields).await?;
            self.insert_in(&*tx, self.tables.key(), key_fields).await
        };
        match inserts.await {
            Ok(()) => tx.commit().await,
            Err(err) => {
                // Best effort: the original statement error is what the
                // caller needs to see.
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback failed after aborted user write");
                }
                Err(err)
            }
        }
    }

    pub async fn update_user(&self, user_id: &str, partial: &UpdateSet) -> Result<()> {
        self.update(self.tables.user(), partial, user_id).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.delete(self.tables.user(), "id", user_id).await
    }

    // --- keys

    pub async fn get_key(&self, key_id: &str) -> Result<Option<KeyRecord>> {
        self.select_first(self.tables.key(), "id", key_id).await
    }

    pub async fn get_keys_by_user_id(&self, user_id: &str) -> Result<Vec<KeyRecord>> {
        self.select_all(self.tables.key(), "user_id", user_id).await
    }

    pub async fn set_key(&self, key: &KeyRecord) -> Result<()> {
        let fields = Fields::from_record_with_attributes(key)?;
        self.insert(self.tables.key(), fields).await
    }

    pub async fn update_key(&self, key_id: &str, partial: &UpdateSet) -> Result<()> {
        self.update(self.tables.key(), partial, key_id).await
    }

    pub async fn delete_key(&self, key_id: &str) -> Result<()> {
        self.delete(self.tables.key(), "id", key_id).await
    }

    pub async fn delete_keys_by_user_id(&self, user_id: &str) -> Result<()> {
        self.delete(self.tables.key(), "user_id", user_id).await
    }

    // --- sessions

    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let Some(table) = self.tables.session() else {
            return Ok(None);
        };
        self.select_first(table, "id", session_id).await
    }

    pub async fn get_sessions_by_user_id(&self, user_id: &str) -> Result<Vec<SessionRecord>> {
        let Some(table) = self.tables.session() else {
            return Ok(Vec::new());
        };
        self.select_all(table, "user_id", user_id).await
    }

    pub async fn set_session(&self, session: &SessionRecord) -> Result<()> {
        let Some(table) = self.tables.session() else {
            return Ok(());
        };
        let fields = Fields::from_record_with_attributes(session)?;
        self.insert(table, fields).await
    }

    pub async fn update_session(&self, session_id: &str, partial: &UpdateSet) -> Result<()> {
        let Some(table) = self.tables.session() else {
            return Ok(());
        };
        self.update(table, partial, session_id).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let Some(table) = self.tables.session() else {
            return Ok(());
        };
        self.delete(table, "id", session_id).await
    }

    pub async fn delete_sessions_by_user_id(&self, user_id: &str) -> Result<()> {
        let Some(table) = self.tables.session() else {
            return Ok(());
        };
        self.delete(table, "user_id", user_id).await
    }

    /// Fetches a session together with the user it belongs to, through a
    /// single INNER JOIN on the user table's foreign key. Returns `None`
    /// when the session does not exist.
    pub async fn get_session_and_user(
        &self,
        session_id: &str,
    ) -> Result<Option<(SessionRecord, UserJoinSession)>> {
        let Some(session_table) = self.tables.session() else {
            return Ok(None);
        };

        let Some(session) = self.get_session(session_id).await? else {
            return Ok(None);
        };

        let stmt = Statement::select_user_join_session(
            self.tables.user(),
            session_table,
            session_id,
        );
        let rows = self.query(&stmt).await?;
        match rows.first() {
            Some(row) => Ok(Some((session, UserJoinSession::from_row(row)?))),
            None => Ok(None),
        }
    }

    // --- statement execution

    async fn query(&self, stmt: &Statement) -> Result<Vec<Row>> {
        let mut params = Vec::new();
        let sql = self.serializer.serialize(stmt, &mut params)?;
        debug!(%sql, "query");
        self.handle.query(&sql, &params).await
    }

    async fn select_first<R: Record>(
        &self,
        table: &str,
        column: &str,
        arg: &str,
    ) -> Result<Option<R>> {
        let mut records = self.select_all(table, column, arg).await?;
        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records.remove(0)))
        }
    }

    async fn select_all<R: Record>(&self, table: &str, column: &str, arg: &str) -> Result<Vec<R>> {
        let stmt = Statement::select_by_column(table, escape(column), arg);
        let rows = self.query(&stmt).await?;
        rows.iter().map(R::from_row).collect()
    }

    async fn insert(&self, table: &str, fields: Fields) -> Result<()> {
        let mut params = Vec::new();
        let sql = self
            .serializer
            .serialize(&Statement::insert(table, fields), &mut params)?;
        debug!(%sql, "execute");
        self.handle.execute(&sql, &params).await?;
        Ok(())
    }

    async fn insert_in(&self, tx: &dyn Transaction, table: &str, fields: Fields) -> Result<()> {
        let mut params = Vec::new();
        let sql = self
            .serializer
            .serialize(&Statement::insert(table, fields), &mut params)?;
        debug!(%sql, "execute in transaction");
        tx.execute(&sql, &params).await?;
        Ok(())
    }

    async fn update(&self, table: &str, partial: &UpdateSet, id: &str) -> Result<()> {
        let stmt = Statement::update(table, Fields::from_update_set(partial), escape("id"), id);
        let mut params = Vec::new();
        let sql = self.serializer.serialize(&stmt, &mut params)?;
        debug!(%sql, "execute");
        self.handle.execute(&sql, &params).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, column: &str, arg: &str) -> Result<()> {
        let stmt = Statement::delete_by_column(table, escape(column), arg);
        let mut params = Vec::new();
        let sql = self.serializer.serialize(&stmt, &mut params)?;
        debug!(%sql, "execute");
        self.handle.execute(&sql, &params).await?;
        Ok(())
    }
}
