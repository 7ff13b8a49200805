use crate::Fields;

use latch_core::stmt::Value;

/// A statement the serializer can render. Table and column names are taken
/// as given; escaping is a property of names, not of statement shape, and
/// happens before a statement is built (see [`crate::escape`]).
#[derive(Debug, Clone)]
pub enum Statement {
    /// `INSERT INTO <table> ( <columns> ) VALUES ( <placeholders> )`
    Insert { table: String, fields: Fields },

    /// `UPDATE <table> SET <assignments> WHERE <key_column> = <placeholder>`
    ///
    /// The key value is pushed after the SET values, so its placeholder
    /// ordinal is always one past the last assignment.
    Update {
        table: String,
        fields: Fields,
        key_column: String,
        key: Value,
    },

    /// `SELECT * FROM <table> WHERE <column> = <placeholder>`
    SelectByColumn {
        table: String,
        column: String,
        arg: Value,
    },

    /// `DELETE FROM <table> WHERE <column> = <placeholder>`
    DeleteByColumn {
        table: String,
        column: String,
        arg: Value,
    },

    /// The session/user joined read: every column of the user table plus
    /// the session id under a collision-free alias.
    SelectUserJoinSession {
        user_table: String,
        session_table: String,
        session_id: Value,
    },
}

impl Statement {
    pub fn insert(table: impl Into<String>, fields: Fields) -> Statement {
        Statement::Insert {
            table: table.into(),
            fields,
        }
    }

    pub fn update(
        table: impl Into<String>,
        fields: Fields,
        key_column: impl Into<String>,
        key: impl Into<Value>,
    ) -> Statement {
        Statement::Update {
            table: table.into(),
            fields,
            key_column: key_column.into(),
            key: key.into(),
        }
    }

    pub fn select_by_column(
        table: impl Into<String>,
        column: impl Into<String>,
        arg: impl Into<Value>,
    ) -> Statement {
        Statement::SelectByColumn {
            table: table.into(),
            column: column.into(),
            arg: arg.into(),
        }
    }

    pub fn delete_by_column(
        table: impl Into<String>,
        column: impl Into<String>,
        arg: impl Into<Value>,
    ) -> Statement {
        Statement::DeleteByColumn {
            table: table.into(),
            column: column.into(),
            arg: arg.into(),
        }
    }

    pub fn select_user_join_session(
        user_table: impl Into<String>,
        session_table: impl Into<String>,
        session_id: impl Into<Value>,
    ) -> Statement {
        Statement::SelectUserJoinSession {
            user_table: user_table.into(),
            session_table: session_table.into(),
            session_id: session_id.into(),
        }
    }
}
