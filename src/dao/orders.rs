use sqlx::PgPool;

use crate::models::{Order, OrderStatus};

pub async fn get_by_id(pool: &PgPool, id: i32) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>("SELECT id, amount, status FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_pending(
    pool: &PgPool,
    customer_id: i32,
    amount: i64,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO orders (customer_id, amount, status) \
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(customer_id)
    .bind(amount)
    .bind(OrderStatus::Pending)
    .fetch_one(pool)
    .await
}

/// Moves a pending order to paid. False when the order was not pending; a
/// paid or cancelled order is never moved back.
pub async fn pay(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    transition(pool, id, OrderStatus::Paid).await
}

/// Moves a pending order to cancelled. False when the order was not pending.
pub async fn cancel(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    transition(pool, id, OrderStatus::Cancelled).await
}

async fn transition(pool: &PgPool, id: i32, to: OrderStatus) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE orders SET status = $2, updated_at = now() \
         WHERE id = $1 AND status = $3",
    )
    .bind(id)
    .bind(to)
    .bind(OrderStatus::Pending)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(updated > 0)
}
