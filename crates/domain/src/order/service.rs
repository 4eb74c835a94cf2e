//! Order service tying together customers, sequences, discounts and state.

use chrono::Utc;
use store::{
    AppliedDiscount, Customer, ListQuery, Money, Order, OrderFilter, OrderId, OrderStatus, Page,
    Store, TargetType,
};

use super::{
    Assignment, CreateInquiry, CreateOrder, MAX_ORDER_CENTS, OrderError, OrderPatch,
    assign_workers, stage_confirmation, transition,
};
use crate::customer::CustomerResolver;
use crate::discount::DiscountService;
use crate::error::DomainError;
use crate::sequence::{SequenceGenerator, SequencePrefix};

const INQUIRY_SERVICE_TYPE: &str = "inquiry";

/// An edited order that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedEdit {
    pub order: Order,
    /// True when this change moves the order into `Confirmed`.
    pub confirming: bool,
}

/// Service for managing orders.
///
/// Confirmation is split in two: callers stage the change here, run
/// [`OrderService::assign`], notify the customer, then
/// [`OrderService::commit`] the result.
#[derive(Clone)]
pub struct OrderService<S: Store> {
    store: S,
    customers: CustomerResolver<S>,
    sequences: SequenceGenerator<S>,
    discounts: DiscountService<S>,
}

impl<S: Store> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self {
            customers: CustomerResolver::new(store.clone()),
            sequences: SequenceGenerator::new(store.clone()),
            discounts: DiscountService::new(store.clone()),
            store,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places a new order in `Pending`.
    ///
    /// Resolves the customer, redeems the referenced discount if it applies,
    /// assigns an `ORD` number and bumps the customer's counters.
    #[tracing::instrument(skip(self, cmd), fields(service_type = %cmd.service_type))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order, DomainError> {
        let service_type = cmd.service_type.trim().to_string();
        if service_type.is_empty() {
            return Err(OrderError::ServiceTypeRequired.into());
        }
        check_amount(cmd.amount)?;

        let customer = self.customers.resolve(&cmd.contact).await?;

        let target = if cmd.selected_housemaid_id.is_some() {
            TargetType::Assistants
        } else {
            TargetType::Workers
        };
        let discount = match cmd.discount_id {
            Some(id) => {
                self.discounts
                    .redeem_for_order(id, target, cmd.amount)
                    .await?
            }
            None => None,
        };
        let placed = self.place_priced(cmd, service_type, &customer, discount).await;
        if placed.is_err()
            && let Some(applied) = &discount
            && let Err(e) = self.discounts.release_redemption(applied).await
        {
            tracing::error!(error = %e, "failed to release discount use");
        }
        placed
    }

    async fn place_priced(
        &self,
        cmd: CreateOrder,
        service_type: String,
        customer: &Customer,
        discount: Option<AppliedDiscount>,
    ) -> Result<Order, DomainError> {
        let amount = discount.map_or(cmd.amount, |d| d.original_amount - d.discount_amount);
        let order_number = self.sequences.next(SequencePrefix::Order).await?;
        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            order_number,
            customer: customer.id,
            service_type,
            date: cmd.date,
            time: cmd.time,
            address: cmd.address.or_else(|| customer.address.clone()),
            city: cmd.city.or_else(|| customer.city.clone()),
            district: cmd.district.or_else(|| customer.district.clone()),
            notes: cmd.notes,
            amount,
            discount,
            status: OrderStatus::Pending,
            selected_worker_id: cmd.selected_worker_id,
            selected_housemaid_id: cmd.selected_housemaid_id,
            assigned_workers: Vec::new(),
            assigned_housemaids: Vec::new(),
            whatsapp_sent: false,
            is_inquiry: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        self.place(order, customer, "order").await
    }

    /// Records an inquiry. Inquiries use the `INQ` sequence and carry no price.
    #[tracing::instrument(skip(self, cmd))]
    pub async fn create_inquiry(&self, cmd: CreateInquiry) -> Result<Order, DomainError> {
        let customer = self.customers.resolve(&cmd.contact).await?;
        let order_number = self.sequences.next(SequencePrefix::Inquiry).await?;
        let now = Utc::now();

        let service_type = cmd
            .service_type
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| INQUIRY_SERVICE_TYPE.to_string());

        let order = Order {
            id: OrderId::new(),
            order_number,
            customer: customer.id,
            service_type,
            date: None,
            time: None,
            address: customer.address.clone(),
            city: customer.city.clone(),
            district: customer.district.clone(),
            notes: cmd.notes,
            amount: Money::zero(),
            discount: None,
            status: OrderStatus::Pending,
            selected_worker_id: None,
            selected_housemaid_id: None,
            assigned_workers: Vec::new(),
            assigned_housemaids: Vec::new(),
            whatsapp_sent: false,
            is_inquiry: true,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        self.place(order, &customer, "inquiry").await
    }

    async fn place(
        &self,
        order: Order,
        customer: &Customer,
        kind: &'static str,
    ) -> Result<Order, DomainError> {
        self.store.insert_order(&order).await?;
        if let Err(e) = self
            .store
            .record_customer_order(customer.id, order.amount, order.created_at)
            .await
        {
            if let Err(undo) = self.store.delete_order(order.id).await {
                tracing::error!(error = %undo, order_id = %order.id, "failed to remove order");
            }
            return Err(e.into());
        }

        metrics::counter!("orders_created_total", "kind" => kind).increment(1);
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            kind,
            "order placed"
        );
        Ok(order)
    }

    /// Loads an order by ID.
    ///
    /// Returns None if the order doesn't exist.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.store.get_order(id).await?)
    }

    /// Loads an order by ID, failing with `NotFound` if it doesn't exist.
    pub async fn require_order(&self, id: OrderId) -> Result<Order, DomainError> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    pub async fn list_orders(
        &self,
        query: &ListQuery,
        filter: &OrderFilter,
    ) -> Result<Page<Order>, DomainError> {
        Ok(self.store.list_orders(query, filter).await?)
    }

    /// Applies a staff edit in memory and reports whether it confirms the order.
    #[tracing::instrument(skip(self, patch))]
    pub async fn stage_edit(
        &self,
        id: OrderId,
        patch: OrderPatch,
    ) -> Result<StagedEdit, DomainError> {
        let mut order = self.require_order(id).await?;
        let now = Utc::now();

        if let Some(service_type) = patch.service_type {
            let service_type = service_type.trim();
            if service_type.is_empty() {
                return Err(OrderError::ServiceTypeRequired.into());
            }
            order.service_type = service_type.to_string();
        }
        if let Some(amount) = patch.amount {
            check_amount(amount)?;
            order.amount = amount;
        }
        if patch.date.is_some() {
            order.date = patch.date;
        }
        if patch.time.is_some() {
            order.time = patch.time;
        }
        if patch.address.is_some() {
            order.address = patch.address;
        }
        if patch.city.is_some() {
            order.city = patch.city;
        }
        if patch.district.is_some() {
            order.district = patch.district;
        }
        if patch.notes.is_some() {
            order.notes = patch.notes;
        }
        if patch.selected_worker_id.is_some() {
            order.selected_worker_id = patch.selected_worker_id;
        }
        if patch.selected_housemaid_id.is_some() {
            order.selected_housemaid_id = patch.selected_housemaid_id;
        }

        let confirming = match patch.status {
            Some(target) => {
                transition(&mut order, target, now)? && target == OrderStatus::Confirmed
            }
            None => false,
        };
        order.updated_at = now;

        Ok(StagedEdit { order, confirming })
    }

    /// Loads an order and stages an explicit confirm action.
    ///
    /// `confirming` is false when the order was already confirmed.
    #[tracing::instrument(skip(self))]
    pub async fn stage_confirm(&self, id: OrderId) -> Result<StagedEdit, DomainError> {
        let mut order = self.require_order(id).await?;
        let confirming = stage_confirmation(&mut order, Utc::now())?;
        Ok(StagedEdit { order, confirming })
    }

    /// Adds the selected staff to the order's assignee sets.
    pub async fn assign(&self, order: &mut Order) -> Result<Assignment, DomainError> {
        assign_workers(&self.store, order).await
    }

    /// Persists a staged order and returns the stored document.
    ///
    /// The store keeps its own order number and notification flag, so the
    /// returned copy reflects any concurrent notification claim.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn commit(&self, order: &Order) -> Result<Order, DomainError> {
        self.store.update_order(order).await?;
        if order.status == OrderStatus::Confirmed {
            tracing::debug!(order_number = %order.order_number, "order confirmed");
        }
        self.require_order(order.id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), DomainError> {
        if !self.store.delete_order(id).await? {
            return Err(DomainError::not_found("Order", id));
        }
        tracing::info!("order deleted");
        Ok(())
    }

    /// Discount administration backed by the same store.
    pub fn discounts(&self) -> &DiscountService<S> {
        &self.discounts
    }
}

fn check_amount(amount: Money) -> Result<(), OrderError> {
    if amount.is_negative() {
        return Err(OrderError::NegativeAmount { amount });
    }
    if amount.cents() > MAX_ORDER_CENTS {
        return Err(OrderError::AmountTooLarge { amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use store::{
        CustomerRepository, DiscountId, DiscountRepository, DiscountType, InMemoryStore,
        StoreError, Worker, WorkerKind, WorkerRepository,
    };

    use crate::customer::ContactDetails;
    use crate::discount::NewDiscount;

    fn service() -> (OrderService<InMemoryStore>, InMemoryStore) {
        let store = InMemoryStore::new();
        (OrderService::new(store.clone()), store)
    }

    fn new_order(phone: &str, amount: i64) -> CreateOrder {
        CreateOrder::new(
            ContactDetails::new(phone).with_name("Layla"),
            "deep-cleaning",
            Money::from_major(amount),
        )
    }

    #[tokio::test]
    async fn create_order_places_pending_order() {
        let (service, store) = service();

        let order = service
            .create_order(
                new_order("0501111111", 150)
                    .with_schedule(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(), "09:00"),
            )
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_number.starts_with("ORD-"));
        assert!(!order.whatsapp_sent);
        assert!(!order.is_inquiry);
        assert_eq!(order.amount, Money::from_major(150));

        let customer = store.get_customer(order.customer).await.unwrap().unwrap();
        assert_eq!(customer.total_orders, 1);
        assert_eq!(customer.total_spent, Money::from_major(150));
        assert_eq!(customer.last_order_date, Some(order.created_at));
    }

    #[tokio::test]
    async fn repeat_customer_counters_accumulate() {
        let (service, store) = service();

        let first = service.create_order(new_order("0502222222", 100)).await.unwrap();
        let second = service.create_order(new_order("0502222222", 60)).await.unwrap();

        assert_eq!(first.customer, second.customer);
        assert_ne!(first.order_number, second.order_number);

        let customer = store.get_customer(first.customer).await.unwrap().unwrap();
        assert_eq!(customer.total_orders, 2);
        assert_eq!(customer.total_spent, Money::from_major(160));
        assert_eq!(store.customer_count().await, 1);
    }

    #[tokio::test]
    async fn create_order_validates_input() {
        let (service, _) = service();

        let mut blank = new_order("0503333333", 10);
        blank.service_type = "  ".to_string();
        let err = service.create_order(blank).await.unwrap_err();
        assert!(matches!(err, DomainError::Order(OrderError::ServiceTypeRequired)));

        let err = service.create_order(new_order("0503333333", -5)).await.unwrap_err();
        assert!(matches!(err, DomainError::Order(OrderError::NegativeAmount { .. })));

        let err = service.create_order(new_order(" ", 10)).await.unwrap_err();
        assert!(matches!(err, DomainError::Order(OrderError::PhoneRequired)));
    }

    #[tokio::test]
    async fn oversized_amount_is_rejected_before_any_write() {
        let (service, store) = service();

        for _ in 0..2 {
            let mut cmd = new_order("0501234567", 0);
            cmd.amount = Money::from_cents(i64::MAX);
            let err = service.create_order(cmd).await.unwrap_err();
            assert!(matches!(err, DomainError::Order(OrderError::AmountTooLarge { .. })));
        }
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.customer_count().await, 0);

        let mut cmd = new_order("0501234567", 0);
        cmd.amount = Money::from_cents(MAX_ORDER_CENTS);
        assert!(service.create_order(cmd).await.is_ok());
    }

    #[tokio::test]
    async fn counter_overflow_rolls_back_order_and_discount() {
        let (service, store) = service();
        let now = Utc::now();
        let discount = service
            .discounts()
            .create(
                NewDiscount::new(
                    "Capped",
                    DiscountType::Percentage,
                    10.0,
                    now - Duration::hours(1),
                    now + Duration::hours(1),
                )
                .with_max_uses(1),
            )
            .await
            .unwrap();

        let first = service.create_order(new_order("0501234567", 100)).await.unwrap();
        let customer = store.get_customer(first.customer).await.unwrap().unwrap();
        let headroom = Money::from_cents(i64::MAX - customer.total_spent.cents());
        store
            .record_customer_order(customer.id, headroom, now)
            .await
            .unwrap();

        let err = service
            .create_order(new_order("0501234567", 200).with_discount(discount.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Store(StoreError::Overflow { .. })));

        assert_eq!(store.order_count().await, 1);
        let customer = store.get_customer(customer.id).await.unwrap().unwrap();
        assert_eq!(customer.total_orders, 2);
        let stored = store.get_discount(discount.id).await.unwrap().unwrap();
        assert_eq!(stored.current_uses, 0);
    }

    #[tokio::test]
    async fn create_order_applies_discount_once() {
        let (service, store) = service();
        let now = Utc::now();
        let discount = service
            .discounts()
            .create(NewDiscount::new(
                "Launch",
                DiscountType::Percentage,
                20.0,
                now - Duration::hours(1),
                now + Duration::hours(1),
            ))
            .await
            .unwrap();

        let order = service
            .create_order(new_order("0504444444", 200).with_discount(discount.id))
            .await
            .unwrap();

        assert_eq!(order.amount, Money::from_major(160));
        let applied = order.discount.unwrap();
        assert_eq!(applied.original_amount, Money::from_major(200));
        assert_eq!(applied.discount_amount, Money::from_major(40));

        let stored = store.get_discount(discount.id).await.unwrap().unwrap();
        assert_eq!(stored.current_uses, 1);
    }

    #[tokio::test]
    async fn unknown_discount_is_ignored() {
        let (service, _) = service();
        let order = service
            .create_order(new_order("0504444445", 90).with_discount(DiscountId::new()))
            .await
            .unwrap();
        assert!(order.discount.is_none());
        assert_eq!(order.amount, Money::from_major(90));
    }

    #[tokio::test]
    async fn inquiry_uses_its_own_sequence() {
        let (service, _) = service();
        let inquiry = service
            .create_inquiry(CreateInquiry {
                contact: ContactDetails::new("0505555555"),
                service_type: None,
                notes: Some("Do you clean offices?".to_string()),
            })
            .await
            .unwrap();

        assert!(inquiry.is_inquiry);
        assert!(inquiry.order_number.starts_with("INQ-"));
        assert_eq!(inquiry.service_type, "inquiry");
        assert_eq!(inquiry.amount, Money::zero());
    }

    #[tokio::test]
    async fn stage_edit_detects_confirmation() {
        let (service, _) = service();
        let order = service.create_order(new_order("0506666666", 100)).await.unwrap();

        let staged = service
            .stage_edit(
                order.id,
                OrderPatch {
                    notes: Some("Bring ladder".to_string()),
                    status: Some(OrderStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(staged.confirming);
        assert_eq!(staged.order.notes.as_deref(), Some("Bring ladder"));

        let committed = service.commit(&staged.order).await.unwrap();
        assert_eq!(committed.status, OrderStatus::Confirmed);

        let again = service
            .stage_edit(
                order.id,
                OrderPatch {
                    status: Some(OrderStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!again.confirming);
    }

    #[tokio::test]
    async fn stage_edit_rejects_illegal_transition() {
        let (service, _) = service();
        let order = service.create_order(new_order("0507777777", 100)).await.unwrap();

        let err = service
            .stage_edit(
                order.id,
                OrderPatch {
                    status: Some(OrderStatus::Done),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn commit_never_rewrites_order_number() {
        let (service, _) = service();
        let order = service.create_order(new_order("0508888888", 100)).await.unwrap();

        let StagedEdit {
            order: mut staged,
            confirming,
        } = service.stage_confirm(order.id).await.unwrap();
        assert!(confirming);
        staged.order_number = "ORD-0-0".to_string();
        staged.whatsapp_sent = true;

        let committed = service.commit(&staged).await.unwrap();
        assert_eq!(committed.order_number, order.order_number);
        assert!(!committed.whatsapp_sent);
    }

    #[tokio::test]
    async fn assign_then_commit_persists_assignees() {
        let (service, store) = service();
        let worker = Worker::new("Omar", WorkerKind::Worker, Utc::now());
        store.insert_worker(&worker).await.unwrap();

        let order = service
            .create_order(new_order("0509999999", 100).with_worker(worker.id))
            .await
            .unwrap();

        let mut staged = service.stage_confirm(order.id).await.unwrap().order;
        let assignment = service.assign(&mut staged).await.unwrap();
        let committed = service.commit(&staged).await.unwrap();

        assert_eq!(assignment.worker.map(|w| w.name), Some("Omar".to_string()));
        assert_eq!(committed.assigned_workers, vec![worker.id]);
        assert_eq!(committed.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn delete_missing_order_is_not_found() {
        let (service, _) = service();
        let err = service.delete_order(OrderId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Order", .. }));
    }
}
