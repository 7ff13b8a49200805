use postgres::types::{accepts, private::BytesMut, to_sql_checked, IsNull, ToSql, Type};

use latch_core::stmt::{self, Value as CoreValue};

#[derive(Debug)]
pub(crate) struct Value(pub(crate) CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

type ToSqlResult = std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> ToSqlResult
    where
        Self: Sized,
    {
        match &self.0 {
            stmt::Value::Bool(value) => value.to_sql(ty, out),
            stmt::Value::I32(value) => match *ty {
                Type::INT2 => {
                    let value = i16::try_from(*value)?;
                    value.to_sql(ty, out)
                }
                Type::INT4 => value.to_sql(ty, out),
                Type::INT8 => {
                    let value = i64::from(*value);
                    value.to_sql(ty, out)
                }
                _ => Err(unsupported(&self.0, ty)),
            },
            stmt::Value::I64(value) => match *ty {
                Type::INT4 => {
                    let value = i32::try_from(*value)?;
                    value.to_sql(ty, out)
                }
                Type::INT8 => value.to_sql(ty, out),
                _ => Err(unsupported(&self.0, ty)),
            },
            stmt::Value::Json(value) => value.to_sql(ty, out),
            stmt::Value::Null => Ok(IsNull::Yes),
            stmt::Value::String(value) => value.to_sql(ty, out),
        }
    }

    accepts!(BOOL, INT2, INT4, INT8, TEXT, VARCHAR, JSON, JSONB);
    to_sql_checked!();
}

fn unsupported(value: &CoreValue, ty: &Type) -> Box<dyn std::error::Error + Sync + Send> {
    format!("cannot bind {} to a {ty} column", value.type_name()).into()
}
