pub mod envelope;
pub mod error;
pub mod pagination;
pub mod schema;
pub mod search;
