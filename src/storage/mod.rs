//! SQLite storage: worker connections, schema, batched inserts, range reads.
//!
//! Workers never share a connection. Each one asks the [`ConnectionFactory`]
//! for a dedicated connection at startup and keeps it for its lifetime; a
//! failure to connect aborts only that worker.

mod connect;
mod insert;
mod read;

// Re-export public API
pub use connect::{ensure_schema, ConnectionFactory};
pub use insert::insert_batch;
pub use read::{count_rows, fetch_page, StoredRecord};
