use sqlx::PgPool;

use crate::models::Customer;

pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
        "SELECT a.email, a.full_name, c.phone, c.address \
         FROM customers c JOIN accounts a ON a.id = c.account_id \
         WHERE a.email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Updates the profile fields of the customer behind `email` in one
/// transaction. False when no customer row matched.
pub async fn edit_info_by_email(
    pool: &PgPool,
    email: &str,
    full_name: &str,
    phone: &str,
    address: &str,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE customers c SET phone = $2, address = $3 \
         FROM accounts a WHERE a.id = c.account_id AND a.email = $1",
    )
    .bind(email)
    .bind(phone)
    .bind(address)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("UPDATE accounts SET full_name = $2 WHERE email = $1")
        .bind(email)
        .bind(full_name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
