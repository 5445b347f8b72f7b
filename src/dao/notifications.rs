use sqlx::PgPool;

use crate::models::Notification;

pub async fn unread_by_customer(
    pool: &PgPool,
    account_id: i32,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        "SELECT id, recipient, title, is_read, created_at \
         FROM notifications WHERE recipient = $1 AND NOT is_read \
         ORDER BY created_at DESC",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
}

/// Scoped to the recipient so one account cannot clear another's
/// notifications. False when nothing matched.
pub async fn mark_read(pool: &PgPool, id: i32, account_id: i32) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient = $2",
    )
    .bind(id)
    .bind(account_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(updated > 0)
}
