use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, DiscountId, Money, OrderId, WorkerId, WorkerKind};
use regex::{Regex, RegexBuilder};
use tokio::sync::RwLock;

use crate::{
    CustomerRepository, DiscountRepository, OrderRepository, Result, SequenceStore, StoreError,
    WorkerRepository,
    query::{DiscountFilter, ListQuery, OrderFilter, Page},
    records::{Customer, Discount, Order, Worker},
};

#[derive(Default)]
struct Tables {
    customers: HashMap<CustomerId, Customer>,
    orders: HashMap<OrderId, Order>,
    discounts: HashMap<DiscountId, Discount>,
    workers: HashMap<WorkerId, Worker>,
    sequences: HashMap<String, i64>,
}

/// In-memory store for development and testing.
///
/// All tables sit behind one lock, so every conditional update (flag
/// claims, counters, usage caps) is atomic with respect to other callers.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Returns the number of stored customers.
    pub async fn customer_count(&self) -> usize {
        self.tables.read().await.customers.len()
    }
}

fn search_regex(query: &ListQuery) -> Result<Option<Regex>> {
    match query.search_pattern() {
        Some(pattern) => Ok(Some(
            RegexBuilder::new(&pattern).case_insensitive(true).build()?,
        )),
        None => Ok(None),
    }
}

fn any_matches(re: &Regex, fields: &[Option<&str>]) -> bool {
    fields.iter().flatten().any(|value| re.is_match(value))
}

/// Sorts by `key` descending, then slices out the requested page.
fn paginate<T, K: Ord>(mut rows: Vec<T>, query: &ListQuery, key: impl Fn(&T) -> K) -> Page<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    let total = rows.len() as u64;
    let items = rows
        .into_iter()
        .skip(query.offset() as usize)
        .take(query.limit as usize)
        .collect();
    Page::new(items, total, query)
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .find(|c| c.phone == phone)
            .cloned())
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn insert_customer(&self, customer: &Customer) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.customers.values().any(|c| c.phone == customer.phone) {
            return Err(StoreError::DuplicateKey {
                entity: "Customer",
                field: "phone",
            });
        }
        if tables.customers.contains_key(&customer.id) {
            return Err(StoreError::DuplicateKey {
                entity: "Customer",
                field: "id",
            });
        }
        tables.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .customers
            .values()
            .any(|c| c.phone == customer.phone && c.id != customer.id)
        {
            return Err(StoreError::DuplicateKey {
                entity: "Customer",
                field: "phone",
            });
        }
        let stored = tables
            .customers
            .get_mut(&customer.id)
            .ok_or_else(|| StoreError::not_found("Customer", customer.id))?;

        stored.phone = customer.phone.clone();
        stored.name = customer.name.clone();
        stored.email = customer.email.clone();
        stored.address = customer.address.clone();
        stored.city = customer.city.clone();
        stored.district = customer.district.clone();
        stored.rating = customer.rating;
        stored.updated_at = customer.updated_at;
        Ok(())
    }

    async fn record_customer_order(
        &self,
        id: CustomerId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .customers
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Customer", id))?;

        let total_spent = stored
            .total_spent
            .checked_add(amount)
            .ok_or(StoreError::Overflow {
                entity: "Customer",
                field: "totalSpent",
            })?;

        stored.total_orders += 1;
        stored.total_spent = total_spent;
        stored.last_order_date = Some(at);
        stored.updated_at = at;
        Ok(())
    }

    async fn list_customers(&self, query: &ListQuery) -> Result<Page<Customer>> {
        let re = search_regex(query)?;
        let tables = self.tables.read().await;
        let rows: Vec<_> = tables
            .customers
            .values()
            .filter(|c| {
                re.as_ref().is_none_or(|re| {
                    any_matches(
                        re,
                        &[Some(c.phone.as_str()), c.name.as_deref(), c.email.as_deref()],
                    )
                })
            })
            .cloned()
            .collect();
        Ok(paginate(rows, query, |c| c.created_at))
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(StoreError::DuplicateKey {
                entity: "Order",
                field: "orderNumber",
            });
        }
        if tables.orders.contains_key(&order.id) {
            return Err(StoreError::DuplicateKey {
                entity: "Order",
                field: "id",
            });
        }
        tables.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| StoreError::not_found("Order", order.id))?;

        let order_number = std::mem::take(&mut stored.order_number);
        let whatsapp_sent = stored.whatsapp_sent;
        let created_at = stored.created_at;

        *stored = order.clone();
        stored.order_number = order_number;
        stored.whatsapp_sent = whatsapp_sent;
        stored.created_at = created_at;
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        Ok(self.tables.write().await.orders.remove(&id).is_some())
    }

    async fn list_orders(&self, query: &ListQuery, filter: &OrderFilter) -> Result<Page<Order>> {
        let re = search_regex(query)?;
        let tables = self.tables.read().await;
        let rows: Vec<_> = tables
            .orders
            .values()
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .filter(|o| filter.customer.is_none_or(|c| o.customer == c))
            .filter(|o| {
                re.as_ref().is_none_or(|re| {
                    any_matches(
                        re,
                        &[
                            Some(o.order_number.as_str()),
                            Some(o.service_type.as_str()),
                            o.address.as_deref(),
                            o.city.as_deref(),
                            o.district.as_deref(),
                        ],
                    )
                })
            })
            .cloned()
            .collect();
        Ok(paginate(rows, query, |o| o.created_at))
    }

    async fn claim_notification(&self, id: OrderId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Order", id))?;

        if stored.whatsapp_sent {
            return Ok(false);
        }
        stored.whatsapp_sent = true;
        Ok(true)
    }

    async fn release_notification(&self, id: OrderId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Order", id))?;
        stored.whatsapp_sent = false;
        Ok(())
    }
}

#[async_trait]
impl DiscountRepository for InMemoryStore {
    async fn get_discount(&self, id: DiscountId) -> Result<Option<Discount>> {
        Ok(self.tables.read().await.discounts.get(&id).cloned())
    }

    async fn insert_discount(&self, discount: &Discount) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.discounts.contains_key(&discount.id) {
            return Err(StoreError::DuplicateKey {
                entity: "Discount",
                field: "id",
            });
        }
        tables.discounts.insert(discount.id, discount.clone());
        Ok(())
    }

    async fn update_discount(&self, discount: &Discount) -> Result<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .discounts
            .get_mut(&discount.id)
            .ok_or_else(|| StoreError::not_found("Discount", discount.id))?;

        let current_uses = stored.current_uses;
        let created_at = stored.created_at;
        *stored = discount.clone();
        stored.current_uses = current_uses;
        stored.created_at = created_at;
        Ok(())
    }

    async fn delete_discount(&self, id: DiscountId) -> Result<bool> {
        Ok(self.tables.write().await.discounts.remove(&id).is_some())
    }

    async fn list_discounts(
        &self,
        query: &ListQuery,
        filter: &DiscountFilter,
    ) -> Result<Page<Discount>> {
        let re = search_regex(query)?;
        let tables = self.tables.read().await;
        let rows: Vec<_> = tables
            .discounts
            .values()
            .filter(|d| filter.target.is_none_or(|t| d.target_type.matches(t)))
            .filter(|d| filter.active.is_none_or(|a| d.is_active == a))
            .filter(|d| {
                filter
                    .running_at
                    .is_none_or(|at| d.start_date <= at && at <= d.end_date)
            })
            .filter(|d| {
                re.as_ref().is_none_or(|re| {
                    any_matches(re, &[Some(d.name.as_str()), d.description.as_deref()])
                })
            })
            .cloned()
            .collect();
        Ok(paginate(rows, query, |d| d.created_at))
    }

    async fn redeem_discount(&self, id: DiscountId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .discounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Discount", id))?;

        if stored.max_uses.is_some_and(|max| stored.current_uses >= max) {
            return Ok(false);
        }
        stored.current_uses += 1;
        Ok(true)
    }

    async fn release_discount(&self, id: DiscountId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.discounts.get_mut(&id)
            && stored.current_uses > 0
        {
            stored.current_uses -= 1;
        }
        Ok(())
    }
}

#[async_trait]
impl WorkerRepository for InMemoryStore {
    async fn get_worker(&self, id: WorkerId) -> Result<Option<Worker>> {
        Ok(self.tables.read().await.workers.get(&id).cloned())
    }

    async fn insert_worker(&self, worker: &Worker) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.workers.contains_key(&worker.id) {
            return Err(StoreError::DuplicateKey {
                entity: "Worker",
                field: "id",
            });
        }
        tables.workers.insert(worker.id, worker.clone());
        Ok(())
    }

    async fn list_workers(
        &self,
        query: &ListQuery,
        kind: Option<WorkerKind>,
    ) -> Result<Page<Worker>> {
        let re = search_regex(query)?;
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .workers
            .values()
            .filter(|w| kind.is_none_or(|k| w.kind == k))
            .filter(|w| {
                re.as_ref().is_none_or(|re| {
                    any_matches(re, &[Some(w.name.as_str()), w.phone.as_deref()])
                })
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| a.name.cmp(&b.name));
        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();
        Ok(Page::new(items, total, query))
    }
}

#[async_trait]
impl SequenceStore for InMemoryStore {
    async fn next_sequence(&self, name: &str) -> Result<i64> {
        let mut tables = self.tables.write().await;
        let value = tables.sequences.entry(name.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::{DiscountType, OrderStatus, TargetType};

    fn make_order(customer: CustomerId, number: &str) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(),
            order_number: number.to_string(),
            customer,
            service_type: "deep-cleaning".to_string(),
            date: None,
            time: None,
            address: Some("King Fahd Rd".to_string()),
            city: Some("Riyadh".to_string()),
            district: None,
            notes: None,
            amount: Money::from_major(100),
            discount: None,
            status: OrderStatus::Pending,
            selected_worker_id: None,
            selected_housemaid_id: None,
            assigned_workers: vec![],
            assigned_housemaids: vec![],
            whatsapp_sent: false,
            is_inquiry: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_discount(target: TargetType, max_uses: Option<i64>) -> Discount {
        let now = Utc::now();
        Discount {
            id: DiscountId::new(),
            name: "Ramadan offer".to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: 10.0,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            is_active: true,
            target_type: target,
            max_uses,
            current_uses: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_customer_rejects_duplicate_phone() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store
            .insert_customer(&Customer::new("0501234567", now))
            .await
            .unwrap();

        let err = store
            .insert_customer(&Customer::new("0501234567", now))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.customer_count().await, 1);
    }

    #[tokio::test]
    async fn record_customer_order_accumulates() {
        let store = InMemoryStore::new();
        let customer = Customer::new("0501234567", Utc::now());
        store.insert_customer(&customer).await.unwrap();

        let at = Utc::now();
        store
            .record_customer_order(customer.id, Money::from_major(100), at)
            .await
            .unwrap();
        store
            .record_customer_order(customer.id, Money::from_major(50), at)
            .await
            .unwrap();

        let stored = store.get_customer(customer.id).await.unwrap().unwrap();
        assert_eq!(stored.total_orders, 2);
        assert_eq!(stored.total_spent, Money::from_major(150));
        assert_eq!(stored.last_order_date, Some(at));
    }

    #[tokio::test]
    async fn record_customer_order_rejects_overflow() {
        let store = InMemoryStore::new();
        let customer = Customer::new("0501234567", Utc::now());
        store.insert_customer(&customer).await.unwrap();

        let at = Utc::now();
        store
            .record_customer_order(customer.id, Money::from_cents(i64::MAX), at)
            .await
            .unwrap();
        let err = store
            .record_customer_order(customer.id, Money::from_cents(1), at)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Overflow { field: "totalSpent", .. }));

        let stored = store.get_customer(customer.id).await.unwrap().unwrap();
        assert_eq!(stored.total_orders, 1);
        assert_eq!(stored.total_spent, Money::from_cents(i64::MAX));
    }

    #[tokio::test]
    async fn update_customer_keeps_counters() {
        let store = InMemoryStore::new();
        let mut customer = Customer::new("0501234567", Utc::now());
        store.insert_customer(&customer).await.unwrap();
        store
            .record_customer_order(customer.id, Money::from_major(10), Utc::now())
            .await
            .unwrap();

        customer.name = Some("Noura".to_string());
        store.update_customer(&customer).await.unwrap();

        let stored = store.get_customer(customer.id).await.unwrap().unwrap();
        assert_eq!(stored.name.as_deref(), Some("Noura"));
        assert_eq!(stored.total_orders, 1);
    }

    #[tokio::test]
    async fn claim_notification_succeeds_once() {
        let store = InMemoryStore::new();
        let order = make_order(CustomerId::new(), "ORD-1-1");
        store.insert_order(&order).await.unwrap();

        assert!(store.claim_notification(order.id).await.unwrap());
        assert!(!store.claim_notification(order.id).await.unwrap());

        store.release_notification(order.id).await.unwrap();
        assert!(store.claim_notification(order.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_order_preserves_number_and_flag() {
        let store = InMemoryStore::new();
        let order = make_order(CustomerId::new(), "ORD-1-1");
        store.insert_order(&order).await.unwrap();
        store.claim_notification(order.id).await.unwrap();

        let mut edited = order.clone();
        edited.order_number = "HIJACKED".to_string();
        edited.whatsapp_sent = false;
        edited.status = OrderStatus::Confirmed;
        store.update_order(&edited).await.unwrap();

        let stored = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.order_number, "ORD-1-1");
        assert!(stored.whatsapp_sent);
        assert_eq!(stored.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn insert_order_rejects_duplicate_number() {
        let store = InMemoryStore::new();
        let customer = CustomerId::new();
        store
            .insert_order(&make_order(customer, "ORD-1-1"))
            .await
            .unwrap();

        let err = store
            .insert_order(&make_order(customer, "ORD-1-1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateKey {
                field: "orderNumber",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn list_orders_searches_and_paginates() {
        let store = InMemoryStore::new();
        let customer = CustomerId::new();
        for i in 0..15 {
            store
                .insert_order(&make_order(customer, &format!("ORD-1-{i}")))
                .await
                .unwrap();
        }

        let page = store
            .list_orders(&ListQuery::new().limit(10), &OrderFilter::default())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total, 15);
        assert_eq!(page.total_pages, 2);

        let page = store
            .list_orders(
                &ListQuery::new().search("ord-1-1"),
                &OrderFilter::default(),
            )
            .await
            .unwrap();
        // ORD-1-1 and ORD-1-10..=14
        assert_eq!(page.total, 6);

        let page = store
            .list_orders(
                &ListQuery::new(),
                &OrderFilter {
                    status: Some(OrderStatus::Done),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn search_treats_input_literally() {
        let store = InMemoryStore::new();
        store
            .insert_order(&make_order(CustomerId::new(), "ORD-1-1"))
            .await
            .unwrap();

        let page = store
            .list_orders(&ListQuery::new().search(".*"), &OrderFilter::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn redeem_discount_respects_cap() {
        let store = InMemoryStore::new();
        let discount = make_discount(TargetType::All, Some(2));
        store.insert_discount(&discount).await.unwrap();

        assert!(store.redeem_discount(discount.id).await.unwrap());
        assert!(store.redeem_discount(discount.id).await.unwrap());
        assert!(!store.redeem_discount(discount.id).await.unwrap());

        let stored = store.get_discount(discount.id).await.unwrap().unwrap();
        assert_eq!(stored.current_uses, 2);
    }

    #[tokio::test]
    async fn release_discount_returns_a_use() {
        let store = InMemoryStore::new();
        let discount = make_discount(TargetType::All, Some(1));
        store.insert_discount(&discount).await.unwrap();

        assert!(store.redeem_discount(discount.id).await.unwrap());
        store.release_discount(discount.id).await.unwrap();
        store.release_discount(discount.id).await.unwrap();

        let stored = store.get_discount(discount.id).await.unwrap().unwrap();
        assert_eq!(stored.current_uses, 0);
        assert!(store.redeem_discount(discount.id).await.unwrap());

        store.release_discount(DiscountId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn list_discounts_treats_all_as_wildcard() {
        let store = InMemoryStore::new();
        store
            .insert_discount(&make_discount(TargetType::All, None))
            .await
            .unwrap();
        store
            .insert_discount(&make_discount(TargetType::Workers, None))
            .await
            .unwrap();
        store
            .insert_discount(&make_discount(TargetType::Assistants, None))
            .await
            .unwrap();

        let filter = DiscountFilter {
            target: Some(TargetType::Workers),
            ..Default::default()
        };
        let page = store
            .list_discounts(&ListQuery::new(), &filter)
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert!(
            page.items
                .iter()
                .all(|d| matches!(d.target_type, TargetType::All | TargetType::Workers))
        );
    }

    #[tokio::test]
    async fn sequences_are_monotonic_per_name() {
        let store = InMemoryStore::new();
        assert_eq!(store.next_sequence("ORD").await.unwrap(), 1);
        assert_eq!(store.next_sequence("ORD").await.unwrap(), 2);
        assert_eq!(store.next_sequence("INQ").await.unwrap(), 1);
        assert_eq!(store.next_sequence("ORD").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn concurrent_sequences_never_collide() {
        let store = InMemoryStore::new();
        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.next_sequence("ORD").await.unwrap() })
            })
            .collect();

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 50);
    }

    #[tokio::test]
    async fn list_workers_filters_by_kind() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store
            .insert_worker(&Worker::new("Amina", WorkerKind::Housemaid, now))
            .await
            .unwrap();
        store
            .insert_worker(&Worker::new("Bilal", WorkerKind::Worker, now))
            .await
            .unwrap();

        let page = store
            .list_workers(&ListQuery::new(), Some(WorkerKind::Housemaid))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Amina");
    }
}
