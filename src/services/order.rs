//! Order engine

use chrono::NaiveDate;
use std::sync::Arc;
use crate::domain::aggregates::{Order, OrderError};
use crate::domain::value_objects::{OrderId, OrderStatus, Page, UserId};
use crate::services::load_actor;
use crate::store::{OrderFilter, Store};
use crate::{Result, StorefrontError};

/// Raw listing filters as the client sent them. Only admins may set any of them.
#[derive(Clone, Debug, Default)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub user_id: Option<UserId>,
    pub order_date: Option<String>,
}

impl OrderListQuery {
    fn has_filters(&self) -> bool {
        self.status.is_some() || self.user_id.is_some() || self.order_date.is_some()
    }
}

#[derive(Debug)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: Page,
    pub total_items: u64,
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>) -> Self { Self { store } }

    /// Turns the user's cart into a pending order and deletes the cart.
    pub async fn create_order(&self, user_id: UserId) -> Result<Order> {
        let actor = load_actor(self.store.as_ref(), user_id).await?;
        if self.store.has_pending_order(actor.user_id).await? {
            return Err(OrderError::UnpaidOrder.into());
        }
        let order = self.store.place_order(actor.user_id).await?;
        order.placed_event().log();
        Ok(order)
    }

    pub async fn get_order(&self, requester: UserId, order_id: OrderId) -> Result<Order> {
        let order = self.accessible_order(requester, order_id).await?;
        order.ensure_viewable()?;
        Ok(order)
    }

    pub async fn update_status(&self, requester: UserId, order_id: OrderId, status: &str) -> Result<Order> {
        let mut order = self.accessible_order(requester, order_id).await?;
        let status: OrderStatus = status.parse()?;
        order.change_status(status)?;
        self.store.save_order_status(&order).await?;
        for event in order.take_events() { event.log(); }
        Ok(order)
    }

    pub async fn cancel_order(&self, requester: UserId, order_id: OrderId) -> Result<Order> {
        let mut order = self.accessible_order(requester, order_id).await?;
        order.cancel()?;
        self.store.save_order_status(&order).await?;
        for event in order.take_events() { event.log(); }
        Ok(order)
    }

    pub async fn delete_order(&self, requester: UserId, order_id: OrderId) -> Result<()> {
        let mut order = self.accessible_order(requester, order_id).await?;
        order.delete()?;
        self.store.delete_order(order.id()).await?;
        for event in order.take_events() { event.log(); }
        Ok(())
    }

    /// Non-admins always get their own orders and may not filter.
    pub async fn list_orders(&self, requester: UserId, query: OrderListQuery, page: Page) -> Result<OrderPage> {
        let actor = load_actor(self.store.as_ref(), requester).await?;
        if !actor.is_admin() && query.has_filters() {
            return Err(StorefrontError::forbidden("Access forbidden for non-admin users"));
        }

        let mut filter = OrderFilter {
            user_id: if actor.is_admin() { query.user_id } else { Some(actor.user_id) },
            status: query.status.as_deref().map(str::parse::<OrderStatus>).transpose()?,
            created: None,
        };
        if let Some(date) = query.order_date.as_deref() {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| StorefrontError::bad_request("Invalid date format. Use YYYY-MM-DD."))?;
            filter = filter.on_date(date);
        }

        let (orders, total_items) = self.store.list_orders(&filter, page).await?;
        Ok(OrderPage { orders, page, total_items })
    }

    async fn accessible_order(&self, requester: UserId, order_id: OrderId) -> Result<Order> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Order not found"))?;
        let actor = load_actor(self.store.as_ref(), requester).await?;
        if !actor.can_access(order.user_id()) {
            return Err(StorefrontError::forbidden("Access forbidden"));
        }
        Ok(order)
    }
}
