pub mod citations;
pub mod db;
pub mod identifiers;
pub mod index_data;
pub mod models;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
