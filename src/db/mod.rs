pub mod changes;
pub mod clients;
pub mod deletion;
pub mod documents;
pub mod fields;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod templates;
pub mod users;
