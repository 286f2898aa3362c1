/// CouchDB-backed room repository.
pub mod couchdb;
/// In-memory room repository used by tests and storeless local runs.
pub mod memory;
/// Database model definitions.
pub mod models;
/// Room storage and retrieval operations.
pub mod room_store;
/// Storage abstraction layer for database operations.
pub mod storage;
