pub mod sqlite_state_store;

pub use sqlite_state_store::SqliteStateStore;
