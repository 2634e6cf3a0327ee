//! Transactional batch inserts.

use sqlx::{Connection, SqliteConnection};

use crate::error_handling::DatabaseError;
use crate::generator::Record;

/// Inserts a batch of records as a single transaction.
///
/// Per-statement autocommit is bypassed by staging every parameterized insert
/// inside one explicit transaction with exactly one commit, so the batch is
/// atomic: either all records become visible or none do. A failure mid-batch
/// rolls back and leaves no partial batch visible.
pub async fn insert_batch(
    conn: &mut SqliteConnection,
    batch: &[Record],
) -> Result<(), DatabaseError> {
    let mut tx = conn.begin().await?;
    for record in batch {
        sqlx::query("INSERT INTO users (first_name, last_name, email, address) VALUES (?, ?, ?, ?)")
            .bind(&record.first_name)
            .bind(&record.last_name)
            .bind(&record.email)
            .bind(&record.address)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}
