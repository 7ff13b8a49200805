use postgres::types::Type;
use postgres::Column;

use latch_core::{driver, stmt, Error, Result};

/// Converts a PostgreSQL result row into a driver [`Row`](driver::Row),
/// decoding each column by its PostgreSQL type.
pub(crate) fn materialize(row: &tokio_postgres::Row) -> Result<driver::Row> {
    let mut out = driver::Row::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        out.push(column.name(), decode(row, index, column)?);
    }
    Ok(out)
}

fn decode(row: &tokio_postgres::Row, index: usize, column: &Column) -> Result<stmt::Value> {
    // NOTE: the inner representation of the PostgreSQL type enum is not
    // accessible, so each type is matched manually.
    let ty = column.type_();

    let value = if ty == &Type::TEXT || ty == &Type::VARCHAR {
        row.try_get::<usize, Option<String>>(index)
            .map_err(Error::driver)?
            .map(stmt::Value::String)
    } else if ty == &Type::BOOL {
        row.try_get::<usize, Option<bool>>(index)
            .map_err(Error::driver)?
            .map(stmt::Value::Bool)
    } else if ty == &Type::INT2 {
        row.try_get::<usize, Option<i16>>(index)
            .map_err(Error::driver)?
            .map(|v| stmt::Value::I32(i32::from(v)))
    } else if ty == &Type::INT4 {
        row.try_get::<usize, Option<i32>>(index)
            .map_err(Error::driver)?
            .map(stmt::Value::I32)
    } else if ty == &Type::INT8 {
        row.try_get::<usize, Option<i64>>(index)
            .map_err(Error::driver)?
            .map(stmt::Value::I64)
    } else if ty == &Type::JSON || ty == &Type::JSONB {
        row.try_get::<usize, Option<serde_json::Value>>(index)
            .map_err(Error::driver)?
            .map(stmt::Value::Json)
    } else {
        return Err(Error::invalid_record(format!(
            "unsupported column type {ty} for column `{}`",
            column.name()
        )));
    };

    Ok(value.unwrap_or(stmt::Value::Null))
}
