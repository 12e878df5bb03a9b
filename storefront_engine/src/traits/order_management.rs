use thiserror::Error;

use crate::db_types::{NewOrderRequest, Order, OrderDetail, OrderStatusType};

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Order not found")]
    OrderNotFound,
    #[error("Product not found: {0}")]
    ProductNotFound(i64),
    #[error("Order contains no items")]
    EmptyOrder,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Places a new order for `user_id`. Unit prices and the total are read from the product table inside the same
    /// transaction as the insert, so a price change cannot tear an order.
    async fn create_order(&self, user_id: i64, order: NewOrderRequest) -> Result<OrderDetail, OrderApiError>;

    /// All orders belonging to `user_id`, newest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderDetail>, OrderApiError>;

    /// All orders in the system, newest first. Admin only; enforcement happens in the access policy.
    async fn fetch_all_orders(&self) -> Result<Vec<OrderDetail>, OrderApiError>;

    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, OrderApiError>;

    async fn delete_order(&self, id: i64) -> Result<(), OrderApiError>;
}
