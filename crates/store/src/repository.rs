use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, DiscountId, Money, OrderId, WorkerId, WorkerKind};

use crate::query::{DiscountFilter, ListQuery, OrderFilter, Page};
use crate::records::{Customer, Discount, Order, Worker};
use crate::Result;

/// Persistence for customers.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Looks a customer up by exact phone number.
    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>>;

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Inserts a new customer.
    ///
    /// Fails with `DuplicateKey` if the phone number is already taken.
    async fn insert_customer(&self, customer: &Customer) -> Result<()>;

    /// Writes contact fields, rating and `updated_at`.
    ///
    /// Order counters are left alone; they only move through
    /// [`record_customer_order`](Self::record_customer_order).
    async fn update_customer(&self, customer: &Customer) -> Result<()>;

    /// Atomically bumps `totalOrders`, adds to `totalSpent` and stamps
    /// `lastOrderDate`.
    async fn record_customer_order(
        &self,
        id: CustomerId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Lists customers, newest first. Search matches name, phone and email.
    async fn list_customers(&self, query: &ListQuery) -> Result<Page<Customer>>;
}

/// Persistence for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Inserts a new order.
    ///
    /// Fails with `DuplicateKey` if the order number is already taken.
    async fn insert_order(&self, order: &Order) -> Result<()>;

    /// Overwrites an existing order.
    ///
    /// `order_number`, `whatsapp_sent` and `created_at` are never written:
    /// the number is immutable and the flag belongs to the notification gate.
    async fn update_order(&self, order: &Order) -> Result<()>;

    /// Deletes an order. Returns false if it did not exist.
    async fn delete_order(&self, id: OrderId) -> Result<bool>;

    /// Lists orders, newest first. Search matches order number, service
    /// type and address fields.
    async fn list_orders(&self, query: &ListQuery, filter: &OrderFilter) -> Result<Page<Order>>;

    /// Atomically sets `whatsapp_sent` from false to true.
    ///
    /// Returns true only for the caller that flipped the flag; concurrent
    /// callers and callers finding it already set get false.
    async fn claim_notification(&self, id: OrderId) -> Result<bool>;

    /// Resets `whatsapp_sent` to false after a failed dispatch.
    async fn release_notification(&self, id: OrderId) -> Result<()>;
}

/// Persistence for discounts.
#[async_trait]
pub trait DiscountRepository: Send + Sync {
    async fn get_discount(&self, id: DiscountId) -> Result<Option<Discount>>;

    async fn insert_discount(&self, discount: &Discount) -> Result<()>;

    /// Overwrites an existing discount, except `current_uses` and `created_at`.
    async fn update_discount(&self, discount: &Discount) -> Result<()>;

    /// Deletes a discount. Returns false if it did not exist.
    async fn delete_discount(&self, id: DiscountId) -> Result<bool>;

    /// Lists discounts, newest first. Search matches name and description.
    async fn list_discounts(
        &self,
        query: &ListQuery,
        filter: &DiscountFilter,
    ) -> Result<Page<Discount>>;

    /// Atomically increments `current_uses` if it is below `max_uses`
    /// (or `max_uses` is unset). Returns false if the cap was reached.
    async fn redeem_discount(&self, id: DiscountId) -> Result<bool>;

    /// Gives back one use taken by [`redeem_discount`](Self::redeem_discount).
    /// A deleted discount or one with no uses is left alone.
    async fn release_discount(&self, id: DiscountId) -> Result<()>;
}

/// Persistence for workers and housemaids.
#[async_trait]
pub trait WorkerRepository: Send + Sync {
    async fn get_worker(&self, id: WorkerId) -> Result<Option<Worker>>;

    async fn insert_worker(&self, worker: &Worker) -> Result<()>;

    /// Lists workers by name, optionally restricted to one kind.
    async fn list_workers(
        &self,
        query: &ListQuery,
        kind: Option<WorkerKind>,
    ) -> Result<Page<Worker>>;
}

/// Named monotonic counters.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Increments the named counter and returns the new value.
    ///
    /// The first call for a name returns 1. Values are never reused.
    async fn next_sequence(&self, name: &str) -> Result<i64>;
}

/// Every repository the order workflow needs, behind one handle.
pub trait Store:
    CustomerRepository
    + OrderRepository
    + DiscountRepository
    + WorkerRepository
    + SequenceStore
    + Clone
    + 'static
{
}

impl<T> Store for T where
    T: CustomerRepository
        + OrderRepository
        + DiscountRepository
        + WorkerRepository
        + SequenceStore
        + Clone
        + 'static
{
}
