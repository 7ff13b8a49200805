use crate::{Error, Result};

/// A value bound to a statement placeholder or decoded from a result row.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// JSON document
    Json(serde_json::Value),

    /// Null value
    #[default]
    Null,

    /// String value
    String(String),
}

impl Value {
    /// Returns a `Value` representing null
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The variant name, used in type-conversion error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::I32(_) => "I32",
            Self::I64(_) => "I64",
            Self::Json(_) => "Json",
            Self::Null => "Null",
            Self::String(_) => "String",
        }
    }

    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(*v),
            _ => Err(Error::type_conversion(self, "bool")),
        }
    }

    /// Converts to `i64`, promoting `I32`.
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Self::I32(v) => Ok(i64::from(*v)),
            Self::I64(v) => Ok(*v),
            _ => Err(Error::type_conversion(self, "i64")),
        }
    }

    pub fn to_text(&self) -> Result<String> {
        match self {
            Self::String(v) => Ok(v.clone()),
            _ => Err(Error::type_conversion(self, "String")),
        }
    }

    /// Converts to `Option<String>`, mapping `Null` to `None`.
    pub fn to_optional_text(&self) -> Result<Option<String>> {
        match self {
            Self::Null => Ok(None),
            Self::String(v) => Ok(Some(v.clone())),
            _ => Err(Error::type_conversion(self, "Option<String>")),
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I32(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(src: serde_json::Value) -> Self {
        Self::Json(src)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(src: Option<T>) -> Self {
        match src {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i32_promotes_to_i64() {
        assert_eq!(Value::I32(7).to_i64().unwrap(), 7);
        assert_eq!(Value::I64(7).to_i64().unwrap(), 7);
    }

    #[test]
    fn null_is_not_text() {
        let err = Value::Null.to_text().unwrap_err();
        assert!(err.is_type_conversion());
        assert_eq!(err.to_string(), "cannot convert Null to String");
    }

    #[test]
    fn optional_text_maps_null_to_none() {
        assert_eq!(Value::Null.to_optional_text().unwrap(), None);
        assert_eq!(
            Value::from("pw").to_optional_text().unwrap(),
            Some("pw".to_string())
        );
        assert!(Value::I64(1).to_optional_text().is_err());
    }

    #[test]
    fn from_option_maps_none_to_null() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::I64(3));
    }
}
