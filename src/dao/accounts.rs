use sqlx::{FromRow, PgPool};

use crate::models::{Account, Role};

#[derive(FromRow)]
struct AccountRow {
    id: i32,
    email: String,
    full_name: String,
    role: Role,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT id, email, full_name FROM accounts WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Matches an account whose stored password digest equals `digest`. Returns
/// the account and its role so the caller can open a session.
pub async fn verify_credentials(
    pool: &PgPool,
    email: &str,
    digest: &str,
) -> Result<Option<(Account, Role)>, sqlx::Error> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, email, full_name, role FROM accounts \
         WHERE email = $1 AND password_digest = $2",
    )
    .bind(email)
    .bind(digest)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| {
        (
            Account {
                id: row.id,
                email: row.email,
                full_name: row.full_name,
            },
            row.role,
        )
    }))
}

/// Creates the account row plus its customer row in one transaction.
pub async fn register_customer(
    pool: &PgPool,
    email: &str,
    full_name: &str,
    digest: &str,
    phone: &str,
    address: &str,
) -> Result<i32, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let account_id: i32 = sqlx::query_scalar(
        "INSERT INTO accounts (email, password_digest, full_name, role) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(email)
    .bind(digest)
    .bind(full_name)
    .bind(Role::Customer)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO customers (account_id, phone, address) VALUES ($1, $2, $3)")
        .bind(account_id)
        .bind(phone)
        .bind(address)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(account_id)
}
