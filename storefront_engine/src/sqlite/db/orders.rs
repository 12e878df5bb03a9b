//! SQLite operations for order placement and the status workflow.

use sfs_common::Money;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrderRequest, Order, OrderDetail, OrderItem, OrderStatusType},
    traits::OrderApiError,
};

/// Inserts the order shell, its items (pricing each from the current product table) and the computed total.
/// Callers are expected to run this inside a transaction so a failed item lookup rolls the whole order back.
pub async fn create_order(
    user_id: i64,
    order: NewOrderRequest,
    conn: &mut SqliteConnection,
) -> Result<OrderDetail, OrderApiError> {
    if order.items.is_empty() {
        return Err(OrderApiError::EmptyOrder);
    }
    let shell = sqlx::query_as::<_, Order>(
        r#"INSERT INTO orders (user_id, total_price, status, full_name, phone_number, shipping_address, payment_method, note)
           VALUES (?, 0, 'PENDING', ?, ?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(user_id)
    .bind(&order.full_name)
    .bind(&order.phone_number)
    .bind(&order.shipping_address)
    .bind(&order.payment_method)
    .bind(&order.note)
    .fetch_one(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(order.items.len());
    let mut total = Money::default();
    for (product_id, quantity) in &order.items {
        let price = sqlx::query_scalar::<_, Money>("SELECT price FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(OrderApiError::ProductNotFound(*product_id))?;
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(shell.id)
        .bind(product_id)
        .bind(quantity)
        .bind(price)
        .fetch_one(&mut *conn)
        .await?;
        total = total + price * *quantity;
        items.push(item);
    }

    let order = sqlx::query_as::<_, Order>("UPDATE orders SET total_price = ? WHERE id = ? RETURNING *")
        .bind(total)
        .bind(shell.id)
        .fetch_one(conn)
        .await?;
    Ok(OrderDetail { order, items })
}

pub async fn fetch_orders_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderDetail>, OrderApiError> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
    attach_items(orders, conn).await
}

pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<OrderDetail>, OrderApiError> {
    let orders =
        sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(&mut *conn).await?;
    attach_items(orders, conn).await
}

async fn attach_items(orders: Vec<Order>, conn: &mut SqliteConnection) -> Result<Vec<OrderDetail>, OrderApiError> {
    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
        let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ? ORDER BY id")
            .bind(order.id)
            .fetch_all(&mut *conn)
            .await?;
        details.push(OrderDetail { order, items });
    }
    Ok(details)
}

pub async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderApiError> {
    let updated = sqlx::query_as::<_, Order>("UPDATE orders SET status = ? WHERE id = ? RETURNING *")
        .bind(status)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    updated.ok_or(OrderApiError::OrderNotFound)
}

pub async fn delete_order(id: i64, conn: &mut SqliteConnection) -> Result<(), OrderApiError> {
    let res = sqlx::query("DELETE FROM orders WHERE id = ?").bind(id).execute(conn).await?;
    if res.rows_affected() == 0 {
        return Err(OrderApiError::OrderNotFound);
    }
    Ok(())
}
