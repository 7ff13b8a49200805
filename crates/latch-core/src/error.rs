use crate::stmt::Value;

/// An error that can occur in Latch.
pub struct Error {
    kind: Box<ErrorKind>,
}

#[derive(Debug)]
enum ErrorKind {
    /// The underlying store rejected or failed a statement. Always carries
    /// the driver's error unchanged.
    Driver(Box<dyn std::error::Error + Send + Sync>),

    /// A statement could not be built, e.g. an UPDATE with an empty SET
    /// clause.
    InvalidStatement(String),

    /// A dynamic attribute names a column already claimed by the typed
    /// schema.
    ColumnCollision(String),

    /// A result row could not be materialized into a typed record.
    InvalidRecord(String),

    /// A value could not be converted to the requested type.
    TypeConversion {
        value: &'static str,
        target: &'static str,
    },

    Anyhow(anyhow::Error),
}

impl Error {
    /// Wraps an error surfaced by the underlying store.
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        ErrorKind::Driver(Box::new(err)).into()
    }

    pub fn invalid_statement(msg: impl Into<String>) -> Error {
        ErrorKind::InvalidStatement(msg.into()).into()
    }

    pub fn column_collision(column: impl Into<String>) -> Error {
        ErrorKind::ColumnCollision(column.into()).into()
    }

    pub fn invalid_record(msg: impl Into<String>) -> Error {
        ErrorKind::InvalidRecord(msg.into()).into()
    }

    pub fn type_conversion(value: &Value, target: &'static str) -> Error {
        ErrorKind::TypeConversion {
            value: value.type_name(),
            target,
        }
        .into()
    }

    pub fn is_driver(&self) -> bool {
        matches!(*self.kind, ErrorKind::Driver(_))
    }

    pub fn is_invalid_statement(&self) -> bool {
        matches!(*self.kind, ErrorKind::InvalidStatement(_))
    }

    pub fn is_column_collision(&self) -> bool {
        matches!(*self.kind, ErrorKind::ColumnCollision(_))
    }

    pub fn is_invalid_record(&self) -> bool {
        matches!(*self.kind, ErrorKind::InvalidRecord(_))
    }

    pub fn is_type_conversion(&self) -> bool {
        matches!(*self.kind, ErrorKind::TypeConversion { .. })
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &*self.kind {
            ErrorKind::Driver(err) => write!(f, "driver error: {err}"),
            ErrorKind::InvalidStatement(msg) => write!(f, "invalid statement: {msg}"),
            ErrorKind::ColumnCollision(column) => {
                write!(f, "attribute `{column}` collides with a schema column")
            }
            ErrorKind::InvalidRecord(msg) => write!(f, "invalid record: {msg}"),
            ErrorKind::TypeConversion { value, target } => {
                write!(f, "cannot convert {value} to {target}")
            }
            ErrorKind::Anyhow(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.kind, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &*self.kind {
            ErrorKind::Driver(err) => Some(err.as_ref()),
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind: Box::new(kind),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        ErrorKind::Anyhow(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = Error::driver(io_err);
        assert!(err.is_driver());
        assert_eq!(err.to_string(), "driver error: reset by peer");
    }

    #[test]
    fn driver_error_source_is_preserved() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = Error::driver(io_err);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "reset by peer");
    }

    #[test]
    fn invalid_statement_display() {
        let err = Error::invalid_statement("UPDATE with an empty SET clause");
        assert!(err.is_invalid_statement());
        assert_eq!(
            err.to_string(),
            "invalid statement: UPDATE with an empty SET clause"
        );
    }

    #[test]
    fn column_collision_display() {
        let err = Error::column_collision("id");
        assert!(err.is_column_collision());
        assert_eq!(err.to_string(), "attribute `id` collides with a schema column");
    }

    #[test]
    fn type_conversion_display() {
        let err = Error::type_conversion(&Value::I64(42), "String");
        assert!(err.is_type_conversion());
        assert_eq!(err.to_string(), "cannot convert I64 to String");
    }

    #[test]
    fn anyhow_bridge() {
        let err: Error = anyhow::anyhow!("something failed").into();
        assert_eq!(err.to_string(), "something failed");
    }
}
