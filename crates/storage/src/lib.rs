pub mod db;
pub mod sqlite;

pub use db::{create_db, DbPool};
pub use sqlite::SqlitePartnerRepository;
