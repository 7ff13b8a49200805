mod adapter;
pub use adapter::Adapter;

mod tables;
pub use tables::TableSet;

pub use latch_core::{async_trait, driver, schema, stmt, Error, Result};
pub use latch_sql::Flavor;
