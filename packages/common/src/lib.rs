pub mod error;
pub mod generator;
pub mod query;
pub mod result;
pub mod serializer;
pub mod visitor;

pub use error::*;
pub use generator::*;
pub use query::*;
pub use result::*;
pub use serializer::*;
pub use visitor::*;
