use crate::{
    driver::Row,
    stmt::{Attributes, Value},
    Error, Result,
};

/// Column alias used by the session/user join so the session id does not
/// collide with the user table's own `id` column.
pub const SESSION_ID_ALIAS: &str = "__session_id";

/// A record type that knows its field-to-column mapping.
///
/// `fields` lists the persisted columns in declaration order; anything not
/// listed is simply never written. Placeholder ordinals are assigned from
/// this order, so it must be deterministic.
pub trait Record: Sized {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Tagged columns in declaration order, paired with their current values.
    fn fields(&self) -> Vec<(&'static str, Value)>;

    /// The open-ended attribute bag, when the record carries one.
    fn attributes(&self) -> Option<&Attributes> {
        None
    }

    /// Materializes a record from a result row.
    ///
    /// Unknown columns are tolerated: attribute-bearing records collect
    /// them into their bag, others ignore them. A missing required column
    /// is an [`Error::invalid_record`].
    fn from_row(row: &Row) -> Result<Self>;
}

fn require<'a>(row: &'a Row, entity: &str, column: &str) -> Result<&'a Value> {
    row.get(column)
        .ok_or_else(|| Error::invalid_record(format!("{entity} row is missing column `{column}`")))
}

/// The primary persisted entity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub attributes: Attributes,
}

impl UserRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
        }
    }

    /// Adds a dynamic attribute, builder style.
    pub fn attribute(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(column.into(), value.into());
        self
    }
}

impl Record for UserRecord {
    const ENTITY: &'static str = "user";

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![("id", Value::from(self.id.as_str()))]
    }

    fn attributes(&self) -> Option<&Attributes> {
        Some(&self.attributes)
    }

    fn from_row(row: &Row) -> Result<Self> {
        let id = require(row, Self::ENTITY, "id")?.to_text()?;

        let mut attributes = Attributes::new();
        for (column, value) in row.iter() {
            if column != "id" {
                attributes.insert(column.to_string(), value.clone());
            }
        }

        Ok(Self { id, attributes })
    }
}

/// A login session, linked to a [`UserRecord`] by foreign key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub active_expires: i64,
    pub idle_expires: i64,
    pub attributes: Attributes,
}

impl SessionRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        active_expires: i64,
        idle_expires: i64,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            active_expires,
            idle_expires,
            attributes: Attributes::new(),
        }
    }

    /// Adds a dynamic attribute, builder style.
    pub fn attribute(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(column.into(), value.into());
        self
    }
}

impl Record for SessionRecord {
    const ENTITY: &'static str = "session";

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::from(self.id.as_str())),
            ("user_id", Value::from(self.user_id.as_str())),
            ("active_expires", Value::from(self.active_expires)),
            ("idle_expires", Value::from(self.idle_expires)),
        ]
    }

    fn attributes(&self) -> Option<&Attributes> {
        Some(&self.attributes)
    }

    fn from_row(row: &Row) -> Result<Self> {
        let entity = Self::ENTITY;
        let id = require(row, entity, "id")?.to_text()?;
        let user_id = require(row, entity, "user_id")?.to_text()?;
        let active_expires = require(row, entity, "active_expires")?.to_i64()?;
        let idle_expires = require(row, entity, "idle_expires")?.to_i64()?;

        let mut attributes = Attributes::new();
        for (column, value) in row.iter() {
            match column {
                "id" | "user_id" | "active_expires" | "idle_expires" => {}
                _ => {
                    attributes.insert(column.to_string(), value.clone());
                }
            }
        }

        Ok(Self {
            id,
            user_id,
            active_expires,
            idle_expires,
            attributes,
        })
    }
}

/// A credential holding an authentication secret, linked to a
/// [`UserRecord`] by foreign key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct KeyRecord {
    pub id: String,
    pub user_id: String,
    pub hashed_password: Option<String>,
}

impl KeyRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        hashed_password: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            hashed_password,
        }
    }
}

impl Record for KeyRecord {
    const ENTITY: &'static str = "key";

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::from(self.id.as_str())),
            ("user_id", Value::from(self.user_id.as_str())),
            ("hashed_password", Value::from(self.hashed_password.clone())),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        let entity = Self::ENTITY;
        let id = require(row, entity, "id")?.to_text()?;
        let user_id = require(row, entity, "user_id")?.to_text()?;
        let hashed_password = match row.get("hashed_password") {
            Some(value) => value.to_optional_text()?,
            None => None,
        };

        Ok(Self {
            id,
            user_id,
            hashed_password,
        })
    }
}

/// The projection returned by the session/user joined read: all user
/// columns plus the session id under [`SESSION_ID_ALIAS`].
#[derive(Debug, Clone, PartialEq)]
pub struct UserJoinSession {
    pub session_id: String,
    pub user: UserRecord,
}

impl UserJoinSession {
    pub fn from_row(row: &Row) -> Result<Self> {
        let session_id = require(row, "user/session join", SESSION_ID_ALIAS)?.to_text()?;

        let user_columns: Row = row
            .iter()
            .filter(|(column, _)| *column != SESSION_ID_ALIAS)
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect();
        let user = UserRecord::from_row(&user_columns)?;

        Ok(Self { session_id, user })
    }
}
