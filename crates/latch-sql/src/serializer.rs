use crate::{fmt::ToSql, params::Params, Comma, Flavor, Statement};

use latch_core::{schema::SESSION_ID_ALIAS, Error, Result};

/// Serialize a statement to a SQL string.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    flavor: Flavor,
}

pub(crate) struct Formatter<'a, T> {
    /// Handle to the serializer
    pub(crate) serializer: &'a Serializer,

    /// Where to write the serialized SQL
    pub(crate) dst: &'a mut String,

    /// Where to store parameters
    pub(crate) params: &'a mut T,
}

impl Serializer {
    pub fn new(flavor: Flavor) -> Serializer {
        Serializer { flavor }
    }

    pub fn postgresql() -> Serializer {
        Serializer::new(Flavor::Postgresql)
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Renders the statement, pushing argument values into `params` in
    /// placeholder order.
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> Result<String> {
        if let Statement::Update { fields, .. } = stmt {
            if fields.is_empty() {
                return Err(Error::invalid_statement(
                    "UPDATE requires at least one SET assignment",
                ));
            }
        }

        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);

        Ok(ret)
    }
}

impl ToSql for &Statement {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        match self {
            Statement::Insert { table, fields } => {
                fmt!(
                    f,
                    "INSERT INTO ", table.as_str(),
                    " ( ", Comma(fields.columns()), " )",
                    " VALUES ( ", Comma(fields.values()), " )",
                );
            }
            Statement::Update {
                table,
                fields,
                key_column,
                key,
            } => {
                // The key is pushed last; its ordinal is len(fields) + 1.
                fmt!(
                    f,
                    "UPDATE ", table.as_str(),
                    " SET ", Comma(fields.assignments()),
                    " WHERE ", key_column.as_str(), " = ", key,
                );
            }
            Statement::SelectByColumn { table, column, arg } => {
                fmt!(
                    f,
                    "SELECT * FROM ", table.as_str(),
                    " WHERE ", column.as_str(), " = ", arg,
                );
            }
            Statement::DeleteByColumn { table, column, arg } => {
                fmt!(
                    f,
                    "DELETE FROM ", table.as_str(),
                    " WHERE ", column.as_str(), " = ", arg,
                );
            }
            Statement::SelectUserJoinSession {
                user_table,
                session_table,
                session_id,
            } => {
                let user = user_table.as_str();
                let session = session_table.as_str();
                fmt!(
                    f,
                    "SELECT ", user, ".*, ", session, ".id AS ", SESSION_ID_ALIAS,
                    " FROM ", session,
                    " INNER JOIN ", user, " ON ", user, ".id = ", session, ".user_id",
                    " WHERE ", session, ".id = ", session_id,
                );
            }
        }
    }
}
