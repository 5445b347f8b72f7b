use sqlx::PgPool;

use crate::models::Staff;

pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<Staff>, sqlx::Error> {
    sqlx::query_as::<_, Staff>(
        "SELECT a.email, a.full_name \
         FROM staff s JOIN accounts a ON a.id = s.account_id \
         WHERE a.email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// False when `email` does not belong to a staff account.
pub async fn edit_name_by_email(
    pool: &PgPool,
    email: &str,
    full_name: &str,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE accounts a SET full_name = $2 \
         FROM staff s WHERE s.account_id = a.id AND a.email = $1",
    )
    .bind(email)
    .bind(full_name)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(updated > 0)
}
