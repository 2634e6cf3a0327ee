//! Bounded range reads for the export path.

use sqlx::SqliteConnection;

use crate::error_handling::DatabaseError;

/// A row read back from the destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// Row identifier assigned by the database.
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact address
    pub email: String,
    /// Physical address
    pub address: String,
}

/// Reads at most `limit` rows starting at `offset`, ordered by id.
///
/// Returning zero rows is not an error: the export path treats it as "no more
/// data yet" and backs off. Gaps from concurrent deletes are tolerated, not
/// retried.
pub async fn fetch_page(
    conn: &mut SqliteConnection,
    limit: u64,
    offset: u64,
) -> Result<Vec<StoredRecord>, DatabaseError> {
    let rows: Vec<(i64, String, String, String, String)> = sqlx::query_as(
        "SELECT id, first_name, last_name, email, address FROM users ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(limit as i64)
    .bind(offset as i64)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, first_name, last_name, email, address)| StoredRecord {
            id,
            first_name,
            last_name,
            email,
            address,
        })
        .collect())
}

/// Counts the rows currently in the destination table.
pub async fn count_rows(conn: &mut SqliteConnection) -> Result<u64, DatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Record;
    use crate::storage::{ensure_schema, insert_batch, ConnectionFactory};
    use tempfile::TempDir;

    async fn seeded_conn(n: usize) -> (TempDir, SqliteConnection) {
        let dir = TempDir::new().expect("tempdir");
        let factory = ConnectionFactory::new(&dir.path().join("test.db"));
        let mut conn = factory.connect().await.expect("connect");
        ensure_schema(&mut conn).await.expect("schema");
        let batch: Vec<Record> = (0..n)
            .map(|i| Record {
                first_name: format!("First{i}"),
                last_name: format!("Last{i}"),
                email: format!("first{i}@example.com"),
                address: format!("{i} Main Street"),
            })
            .collect();
        insert_batch(&mut conn, &batch).await.expect("seed");
        (dir, conn)
    }

    #[tokio::test]
    async fn test_fetch_page_respects_limit_and_offset() {
        let (_dir, mut conn) = seeded_conn(10).await;

        let page = fetch_page(&mut conn, 4, 0).await.expect("page");
        assert_eq!(page.len(), 4);
        assert_eq!(page[0].first_name, "First0");

        let page = fetch_page(&mut conn, 4, 8).await.expect("page");
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].first_name, "First8");
    }

    #[tokio::test]
    async fn test_fetch_page_past_end_is_empty_not_error() {
        let (_dir, mut conn) = seeded_conn(3).await;
        let page = fetch_page(&mut conn, 10, 100).await.expect("page");
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_page_is_ordered_by_id() {
        let (_dir, mut conn) = seeded_conn(20).await;
        let page = fetch_page(&mut conn, 20, 0).await.expect("page");
        let ids: Vec<i64> = page.iter().map(|r| r.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn test_count_rows() {
        let (_dir, mut conn) = seeded_conn(7).await;
        assert_eq!(count_rows(&mut conn).await.expect("count"), 7);
    }
}
