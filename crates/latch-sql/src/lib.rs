#[macro_use]
mod fmt;

mod delim;
use delim::Comma;

mod fields;
pub use fields::Fields;

mod flavor;
pub use flavor::Flavor;

mod ident;
pub use ident::escape;

mod params;
pub use params::{Params, Placeholder};

mod serializer;
pub use serializer::Serializer;

mod stmt;
pub use stmt::Statement;
