use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role stored on the account row and carried in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
pub enum Role {
    Customer,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: i32,
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct Customer {
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Staff {
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i32,
    pub amount: i64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: i32,
    pub recipient: i32,
    pub title: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
