use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use latch::driver::{Handle, Row, Transaction};
use latch::schema::{KeyRecord, SessionRecord, UserRecord, SESSION_ID_ALIAS};
use latch::stmt::{UpdateSet, Value};
use latch::{async_trait, Adapter, Error, Result, TableSet};

use pretty_assertions::assert_eq;

/// A scriptable in-memory stand-in for the database handle. Records every
/// statement it is given; `query` answers from a queue of canned row sets
/// (empty when the queue runs dry); statements whose text contains the
/// configured needle fail with a driver error.
#[derive(Debug, Default)]
struct MockState {
    executed: Vec<(String, Vec<Value>)>,
    tx_executed: Vec<(String, Vec<Value>)>,
    queried: Vec<(String, Vec<Value>)>,
    results: VecDeque<Vec<Row>>,
    fail_matching: Option<String>,
    begun: usize,
    committed: usize,
    rolled_back: usize,
}

impl MockState {
    fn check_failure(&self, sql: &str) -> Result<()> {
        match &self.fail_matching {
            Some(needle) if sql.contains(needle.as_str()) => Err(Error::driver(
                std::io::Error::new(std::io::ErrorKind::Other, "forced failure"),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    fn shared(&self) -> Arc<Mutex<MockState>> {
        self.state.clone()
    }
}

fn lock(state: &Arc<Mutex<MockState>>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap()
}

#[async_trait]
impl Handle for MockHandle {
    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.check_failure(sql)?;
        state.executed.push((sql.to_string(), args.to_vec()));
        Ok(1)
    }

    async fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        let mut state = self.state.lock().unwrap();
        state.check_failure(sql)?;
        state.queried.push((sql.to_string(), args.to_vec()));
        Ok(state.results.pop_front().unwrap_or_default())
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        self.state.lock().unwrap().begun += 1;
        Ok(Box::new(MockTransaction {
            state: self.state.clone(),
        }))
    }
}

struct MockTransaction {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl Transaction for MockTransaction {
    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.check_failure(sql)?;
        state.tx_executed.push((sql.to_string(), args.to_vec()));
        Ok(1)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.state.lock().unwrap().committed += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.state.lock().unwrap().rolled_back += 1;
        Ok(())
    }
}

/// Fails the test if any operation reaches the store.
#[derive(Debug)]
struct PanicHandle;

#[async_trait]
impl Handle for PanicHandle {
    async fn execute(&self, sql: &str, _args: &[Value]) -> Result<u64> {
        panic!("unexpected execute: {sql}");
    }

    async fn query(&self, sql: &str, _args: &[Value]) -> Result<Vec<Row>> {
        panic!("unexpected query: {sql}");
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        panic!("unexpected transaction");
    }
}

fn tables() -> TableSet {
    TableSet::new("auth_user", "auth_key").with_session("auth_session")
}

fn adapter() -> (Adapter<MockHandle>, Arc<Mutex<MockState>>) {
    let handle = MockHandle::default();
    let state = handle.shared();
    (Adapter::new(handle, tables()), state)
}

fn user_row(id: &str, username: &str) -> Row {
    let mut row = Row::new();
    row.push("id", id);
    row.push("username", username);
    row
}

fn session_row(id: &str, user_id: &str) -> Row {
    let mut row = Row::new();
    row.push("id", id);
    row.push("user_id", user_id);
    row.push("active_expires", 10_i64);
    row.push("idle_expires", 20_i64);
    row
}

#[tokio::test]
async fn set_user_without_key_issues_a_single_insert() {
    let (adapter, state) = adapter();
    let user = UserRecord::new("u1").attribute("username", "alice");

    adapter.set_user(&user, None).await.unwrap();

    let state = lock(&state);
    assert_eq!(state.begun, 0);
    assert_eq!(
        state.executed,
        vec![(
            "INSERT INTO \"auth_user\" ( \"id\", \"username\" ) VALUES ( $1, $2 )".to_string(),
            vec![Value::from("u1"), Value::from("alice")],
        )]
    );
}

#[tokio::test]
async fn set_user_with_key_inserts_user_then_key_and_commits() {
    let (adapter, state) = adapter();
    let user = UserRecord::new("u1").attribute("username", "alice");
    let key = KeyRecord::new("k1", "u1", Some("hash".to_string()));

    adapter.set_user(&user, Some(&key)).await.unwrap();

    let state = lock(&state);
    assert_eq!(state.begun, 1);
    assert_eq!(state.committed, 1);
    assert_eq!(state.rolled_back, 0);
    assert!(state.executed.is_empty());
    assert_eq!(
        state.tx_executed,
        vec![
            (
                "INSERT INTO \"auth_user\" ( \"id\", \"username\" ) VALUES ( $1, $2 )".to_string(),
                vec![Value::from("u1"), Value::from("alice")],
            ),
            (
                "INSERT INTO \"auth_key\" ( \"id\", \"user_id\", \"hashed_password\" ) \
                 VALUES ( $1, $2, $3 )"
                    .to_string(),
                vec![Value::from("k1"), Value::from("u1"), Value::from("hash")],
            ),
        ]
    );
}

#[tokio::test]
async fn failed_key_insert_rolls_the_user_back() {
    let (adapter, state) = adapter();
    lock(&state).fail_matching = Some("auth_key".to_string());

    let user = UserRecord::new("u1");
    let key = KeyRecord::new("k1", "u1", None);

    let err = adapter.set_user(&user, Some(&key)).await.unwrap_err();
    assert!(err.is_driver());

    {
        let state = lock(&state);
        assert_eq!(state.rolled_back, 1);
        assert_eq!(state.committed, 0);
        // The user insert reached the transaction, nothing was committed.
        assert_eq!(state.tx_executed.len(), 1);
    }

    // The store never saw a commit, so the user is gone.
    assert_eq!(adapter.get_user("u1").await.unwrap(), None);
}

#[tokio::test]
async fn get_user_returns_none_without_error() {
    let (adapter, state) = adapter();

    let fetched = adapter.get_user("missing").await.unwrap();
    assert_eq!(fetched, None);

    let state = lock(&state);
    assert_eq!(
        state.queried,
        vec![(
            "SELECT * FROM \"auth_user\" WHERE \"id\" = $1".to_string(),
            vec![Value::from("missing")],
        )]
    );
}

#[tokio::test]
async fn get_user_materializes_extra_columns_as_attributes() {
    let (adapter, state) = adapter();
    lock(&state).results.push_back(vec![user_row("u1", "alice")]);

    let fetched = adapter.get_user("u1").await.unwrap().unwrap();
    assert_eq!(fetched, UserRecord::new("u1").attribute("username", "alice"));
}

#[tokio::test]
async fn update_user_binds_the_id_after_the_set_values() {
    let (adapter, state) = adapter();

    let partial = UpdateSet::new().set("username", "bob");
    adapter.update_user("u1", &partial).await.unwrap();

    let state = lock(&state);
    assert_eq!(
        state.executed,
        vec![(
            "UPDATE \"auth_user\" SET \"username\" = $1 WHERE \"id\" = $2".to_string(),
            vec![Value::from("bob"), Value::from("u1")],
        )]
    );
}

#[tokio::test]
async fn empty_update_is_rejected_before_execution() {
    let (adapter, state) = adapter();

    let err = adapter.update_user("u1", &UpdateSet::new()).await.unwrap_err();
    assert!(err.is_invalid_statement());
    assert!(lock(&state).executed.is_empty());
}

#[tokio::test]
async fn attribute_collision_is_rejected_before_any_statement() {
    let (adapter, state) = adapter();
    let user = UserRecord::new("u1").attribute("id", "other");
    let key = KeyRecord::new("k1", "u1", None);

    let err = adapter.set_user(&user, Some(&key)).await.unwrap_err();
    assert!(err.is_column_collision());

    let state = lock(&state);
    assert_eq!(state.begun, 0);
    assert!(state.executed.is_empty());
    assert!(state.tx_executed.is_empty());
}

#[tokio::test]
async fn delete_statements_target_the_requested_column() {
    let (adapter, state) = adapter();

    adapter.delete_user("u1").await.unwrap();
    adapter.delete_keys_by_user_id("u1").await.unwrap();
    adapter.delete_sessions_by_user_id("u1").await.unwrap();

    let state = lock(&state);
    let sql: Vec<&str> = state.executed.iter().map(|(sql, _)| sql.as_str()).collect();
    assert_eq!(
        sql,
        vec![
            "DELETE FROM \"auth_user\" WHERE \"id\" = $1",
            "DELETE FROM \"auth_key\" WHERE \"user_id\" = $1",
            "DELETE FROM \"auth_session\" WHERE \"user_id\" = $1",
        ]
    );
}

#[tokio::test]
async fn set_session_merges_dynamic_attributes() {
    let (adapter, state) = adapter();
    let session = SessionRecord::new("s1", "u1", 10, 20).attribute("country", "NZ");

    adapter.set_session(&session).await.unwrap();

    let state = lock(&state);
    assert_eq!(
        state.executed,
        vec![(
            "INSERT INTO \"auth_session\" \
             ( \"id\", \"user_id\", \"active_expires\", \"idle_expires\", \"country\" ) \
             VALUES ( $1, $2, $3, $4, $5 )"
                .to_string(),
            vec![
                Value::from("s1"),
                Value::from("u1"),
                Value::I64(10),
                Value::I64(20),
                Value::from("NZ"),
            ],
        )]
    );
}

#[tokio::test]
async fn sessions_by_user_id_keep_database_order() {
    let (adapter, state) = adapter();
    lock(&state)
        .results
        .push_back(vec![session_row("s1", "u1"), session_row("s2", "u1")]);

    let sessions = adapter.get_sessions_by_user_id("u1").await.unwrap();
    let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["s1", "s2"]);
}

#[tokio::test]
async fn session_operations_are_noops_without_a_session_table() {
    let adapter = Adapter::new(PanicHandle, TableSet::new("auth_user", "auth_key"));

    assert_eq!(adapter.get_session("s1").await.unwrap(), None);
    assert!(adapter.get_sessions_by_user_id("u1").await.unwrap().is_empty());
    assert_eq!(adapter.get_session_and_user("s1").await.unwrap(), None);

    let session = SessionRecord::new("s1", "u1", 10, 20);
    adapter.set_session(&session).await.unwrap();
    adapter
        .update_session("s1", &UpdateSet::new().set("country", "NZ"))
        .await
        .unwrap();
    adapter.delete_session("s1").await.unwrap();
    adapter.delete_sessions_by_user_id("u1").await.unwrap();
}

#[tokio::test]
async fn get_session_and_user_returns_both_records() {
    let (adapter, state) = adapter();
    {
        let mut state = lock(&state);
        state.results.push_back(vec![session_row("s1", "u1")]);

        let mut join_row = user_row("u1", "alice");
        join_row.push(SESSION_ID_ALIAS, "s1");
        state.results.push_back(vec![join_row]);
    }

    let (session, joined) = adapter.get_session_and_user("s1").await.unwrap().unwrap();
    assert_eq!(session.id, "s1");
    assert_eq!(joined.session_id, "s1");
    assert_eq!(joined.user, UserRecord::new("u1").attribute("username", "alice"));

    let state = lock(&state);
    assert_eq!(state.queried.len(), 2);
    assert_eq!(
        state.queried[1].0,
        "SELECT \"auth_user\".*, \"auth_session\".id AS __session_id \
         FROM \"auth_session\" \
         INNER JOIN \"auth_user\" ON \"auth_user\".id = \"auth_session\".user_id \
         WHERE \"auth_session\".id = $1"
    );
}

#[tokio::test]
async fn missing_session_short_circuits_the_join() {
    let (adapter, state) = adapter();

    let joined = adapter.get_session_and_user("missing").await.unwrap();
    assert_eq!(joined, None);

    // Only the session lookup ran; the join was never issued.
    assert_eq!(lock(&state).queried.len(), 1);
}
