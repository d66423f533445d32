pub mod campaigns;
pub mod database;
pub mod error;
pub mod locations;
pub mod npcs;
pub mod party;
pub mod row_helpers;
pub mod schema;
pub mod sessions;

pub use database::Database;
pub use error::StoreError;
