use std::fmt::Debug;

use log::debug;

use crate::{
    db_types::{NewOrderRequest, Order, OrderDetail, OrderStatusType},
    traits::{OrderApiError, OrderManagement},
};

pub struct OrderApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi ({:?})", self.db)
    }
}

impl<B> OrderApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn place_order(&self, user_id: i64, order: NewOrderRequest) -> Result<OrderDetail, OrderApiError> {
        let detail = self.db.create_order(user_id, order).await?;
        debug!("🛒️ Order #{} placed by user #{user_id} for {}", detail.order.id, detail.order.total_price);
        Ok(detail)
    }

    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<OrderDetail>, OrderApiError> {
        self.db.fetch_orders_for_user(user_id).await
    }

    pub async fn all_orders(&self) -> Result<Vec<OrderDetail>, OrderApiError> {
        self.db.fetch_all_orders().await
    }

    pub async fn update_status(&self, id: i64, status: OrderStatusType) -> Result<Order, OrderApiError> {
        let order = self.db.update_order_status(id, status).await?;
        debug!("🛒️ Order #{id} moved to {status}");
        Ok(order)
    }

    pub async fn delete_order(&self, id: i64) -> Result<(), OrderApiError> {
        self.db.delete_order(id).await
    }
}
