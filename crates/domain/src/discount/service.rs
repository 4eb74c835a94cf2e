//! Discount administration and redemption.

use chrono::{DateTime, Utc};
use store::{
    AppliedDiscount, Discount, DiscountFilter, DiscountId, DiscountRepository, DiscountType,
    ListQuery, Money, Page, StoreError, TargetType,
};

use super::{DiscountError, DiscountQuote, apply_discount, validate_discount};
use crate::error::DomainError;

/// Fields for a new discount.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDiscount {
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub target_type: TargetType,
    pub max_uses: Option<i64>,
}

impl NewDiscount {
    pub fn new(
        name: impl Into<String>,
        discount_type: DiscountType,
        discount_value: f64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            discount_type,
            discount_value,
            start_date,
            end_date,
            is_active: true,
            target_type: TargetType::All,
            max_uses: None,
        }
    }

    pub fn with_target(mut self, target_type: TargetType) -> Self {
        self.target_type = target_type;
        self
    }

    pub fn with_max_uses(mut self, max_uses: i64) -> Self {
        self.max_uses = Some(max_uses);
        self
    }
}

/// Partial update of a discount. `None` leaves a field untouched.
///
/// Nullable fields use a nested option: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub target_type: Option<TargetType>,
    pub max_uses: Option<Option<i64>>,
}

impl DiscountPatch {
    fn apply_to(self, discount: &mut Discount) {
        if let Some(name) = self.name {
            discount.name = name;
        }
        if let Some(description) = self.description {
            discount.description = description;
        }
        if let Some(discount_type) = self.discount_type {
            discount.discount_type = discount_type;
        }
        if let Some(value) = self.discount_value {
            discount.discount_value = value;
        }
        if let Some(start) = self.start_date {
            discount.start_date = start;
        }
        if let Some(end) = self.end_date {
            discount.end_date = end;
        }
        if let Some(active) = self.is_active {
            discount.is_active = active;
        }
        if let Some(target) = self.target_type {
            discount.target_type = target;
        }
        if let Some(max_uses) = self.max_uses {
            discount.max_uses = max_uses;
        }
    }
}

/// Service for managing and redeeming discounts.
#[derive(Clone)]
pub struct DiscountService<R> {
    repo: R,
}

impl<R: DiscountRepository> DiscountService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: NewDiscount) -> Result<Discount, DomainError> {
        let now = Utc::now();
        let discount = Discount {
            id: DiscountId::new(),
            name: new.name.trim().to_string(),
            description: new.description,
            discount_type: new.discount_type,
            discount_value: new.discount_value,
            start_date: new.start_date,
            end_date: new.end_date,
            is_active: new.is_active,
            target_type: new.target_type,
            max_uses: new.max_uses,
            current_uses: 0,
            created_at: now,
            updated_at: now,
        };
        validate_discount(&discount)?;

        self.repo.insert_discount(&discount).await?;
        tracing::info!(discount_id = %discount.id, "discount created");
        Ok(discount)
    }

    pub async fn get(&self, id: DiscountId) -> Result<Option<Discount>, DomainError> {
        Ok(self.repo.get_discount(id).await?)
    }

    pub async fn require(&self, id: DiscountId) -> Result<Discount, DomainError> {
        self.repo
            .get_discount(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Discount", id))
    }

    pub async fn list(
        &self,
        query: &ListQuery,
        filter: &DiscountFilter,
    ) -> Result<Page<Discount>, DomainError> {
        Ok(self.repo.list_discounts(query, filter).await?)
    }

    /// Applies a partial update. The usage counter is never written here.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: DiscountId,
        patch: DiscountPatch,
    ) -> Result<Discount, DomainError> {
        let mut discount = self.require(id).await?;
        patch.apply_to(&mut discount);
        discount.name = discount.name.trim().to_string();
        validate_discount(&discount)?;

        discount.updated_at = Utc::now();
        self.repo.update_discount(&discount).await?;
        Ok(discount)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: DiscountId) -> Result<(), DomainError> {
        if !self.repo.delete_discount(id).await? {
            return Err(DomainError::not_found("Discount", id));
        }
        tracing::info!("discount deleted");
        Ok(())
    }

    /// Prices `price` against the discount without consuming a use.
    pub async fn quote(&self, id: DiscountId, price: Money) -> Result<DiscountQuote, DomainError> {
        if price.is_negative() {
            return Err(DiscountError::NegativePrice.into());
        }
        let discount = self.require(id).await?;
        Ok(apply_discount(&discount, price, Utc::now()))
    }

    /// Prices an order amount and consumes one use of the discount.
    ///
    /// Returns `None` when the discount is missing, does not target
    /// `target`, is not currently valid, or its last use was taken
    /// concurrently.
    #[tracing::instrument(skip(self))]
    pub async fn redeem_for_order(
        &self,
        id: DiscountId,
        target: TargetType,
        price: Money,
    ) -> Result<Option<AppliedDiscount>, DomainError> {
        let Some(discount) = self.repo.get_discount(id).await? else {
            tracing::warn!("referenced discount does not exist");
            return Ok(None);
        };
        if !discount.target_type.matches(target) {
            tracing::debug!(target = %discount.target_type, "discount does not target order");
            return Ok(None);
        }

        let quote = apply_discount(&discount, price, Utc::now());
        if !quote.applied {
            return Ok(None);
        }
        match self.repo.redeem_discount(id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("discount exhausted before redemption");
                return Ok(None);
            }
            Err(StoreError::NotFound { .. }) => {
                tracing::warn!("discount deleted before redemption");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        metrics::counter!("discount_redemptions_total").increment(1);
        Ok(Some(AppliedDiscount {
            discount_id: id,
            original_amount: quote.original_price,
            discount_amount: quote.discount_amount,
        }))
    }

    /// Returns the use taken by [`redeem_for_order`](Self::redeem_for_order)
    /// when the order it priced could not be placed.
    #[tracing::instrument(skip(self, applied), fields(discount_id = %applied.discount_id))]
    pub async fn release_redemption(&self, applied: &AppliedDiscount) -> Result<(), DomainError> {
        self.repo.release_discount(applied.discount_id).await?;
        tracing::info!("discount use released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use store::InMemoryStore;

    /// Deletes each discount right after handing it out, as a concurrent
    /// admin delete would.
    #[derive(Clone)]
    struct VanishingRepo {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl DiscountRepository for VanishingRepo {
        async fn get_discount(&self, id: DiscountId) -> store::Result<Option<Discount>> {
            let found = self.inner.get_discount(id).await?;
            self.inner.delete_discount(id).await?;
            Ok(found)
        }

        async fn insert_discount(&self, discount: &Discount) -> store::Result<()> {
            self.inner.insert_discount(discount).await
        }

        async fn update_discount(&self, discount: &Discount) -> store::Result<()> {
            self.inner.update_discount(discount).await
        }

        async fn delete_discount(&self, id: DiscountId) -> store::Result<bool> {
            self.inner.delete_discount(id).await
        }

        async fn list_discounts(
            &self,
            query: &ListQuery,
            filter: &DiscountFilter,
        ) -> store::Result<Page<Discount>> {
            self.inner.list_discounts(query, filter).await
        }

        async fn redeem_discount(&self, id: DiscountId) -> store::Result<bool> {
            self.inner.redeem_discount(id).await
        }

        async fn release_discount(&self, id: DiscountId) -> store::Result<()> {
            self.inner.release_discount(id).await
        }
    }

    fn running(name: &str) -> NewDiscount {
        let now = Utc::now();
        NewDiscount::new(
            name,
            DiscountType::Percentage,
            10.0,
            now - Duration::days(1),
            now + Duration::days(7),
        )
    }

    #[tokio::test]
    async fn create_validates_definition() {
        let service = DiscountService::new(InMemoryStore::new());

        let mut bad = running("Broken");
        bad.end_date = bad.start_date - Duration::hours(1);
        let err = service.create(bad).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Discount(DiscountError::InvalidDateRange { .. })
        ));

        let created = service.create(running("Welcome")).await.unwrap();
        assert_eq!(created.current_uses, 0);
        assert!(service.get(created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_applies_patch_and_keeps_usage() {
        let store = InMemoryStore::new();
        let service = DiscountService::new(store.clone());
        let created = service.create(running("Welcome").with_max_uses(5)).await.unwrap();
        assert!(store.redeem_discount(created.id).await.unwrap());

        let patch = DiscountPatch {
            discount_value: Some(25.0),
            description: Some(Some("Spring offer".to_string())),
            max_uses: Some(None),
            ..Default::default()
        };
        let updated = service.update(created.id, patch).await.unwrap();

        assert_eq!(updated.discount_value, 25.0);
        assert_eq!(updated.description.as_deref(), Some("Spring offer"));
        assert_eq!(updated.max_uses, None);
        assert_eq!(updated.current_uses, 1);
    }

    #[tokio::test]
    async fn update_rejects_invalid_result() {
        let service = DiscountService::new(InMemoryStore::new());
        let created = service.create(running("Welcome")).await.unwrap();

        let patch = DiscountPatch {
            discount_value: Some(150.0),
            ..Default::default()
        };
        let err = service.update(created.id, patch).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Discount(DiscountError::PercentageOutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let service = DiscountService::new(InMemoryStore::new());
        let err = service.delete(DiscountId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Discount", .. }));
    }

    #[tokio::test]
    async fn quote_does_not_consume_uses() {
        let service = DiscountService::new(InMemoryStore::new());
        let created = service.create(running("Welcome").with_max_uses(1)).await.unwrap();

        let quote = service.quote(created.id, Money::from_major(100)).await.unwrap();
        assert!(quote.applied);
        assert_eq!(quote.discounted_price, Money::from_major(90));

        let again = service.quote(created.id, Money::from_major(100)).await.unwrap();
        assert!(again.applied);

        let err = service
            .quote(created.id, Money::from_cents(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Discount(DiscountError::NegativePrice)));
    }

    #[tokio::test]
    async fn redemption_respects_cap_and_target() {
        let service = DiscountService::new(InMemoryStore::new());
        let created = service
            .create(running("Once").with_target(TargetType::Workers).with_max_uses(1))
            .await
            .unwrap();
        let price = Money::from_major(50);

        let wrong_target = service
            .redeem_for_order(created.id, TargetType::Assistants, price)
            .await
            .unwrap();
        assert!(wrong_target.is_none());

        let applied = service
            .redeem_for_order(created.id, TargetType::Workers, price)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(applied.discount_amount, Money::from_major(5));

        let exhausted = service
            .redeem_for_order(created.id, TargetType::Workers, price)
            .await
            .unwrap();
        assert!(exhausted.is_none());

        let stored = service.require(created.id).await.unwrap();
        assert_eq!(stored.current_uses, 1);
    }

    #[tokio::test]
    async fn discount_deleted_mid_redemption_is_ignored() {
        let store = InMemoryStore::new();
        let created = DiscountService::new(store.clone())
            .create(running("Short lived"))
            .await
            .unwrap();

        let service = DiscountService::new(VanishingRepo { inner: store });
        let applied = service
            .redeem_for_order(created.id, TargetType::Workers, Money::from_major(50))
            .await
            .unwrap();
        assert!(applied.is_none());
    }

    #[tokio::test]
    async fn released_redemption_frees_the_use() {
        let service = DiscountService::new(InMemoryStore::new());
        let created = service.create(running("Once").with_max_uses(1)).await.unwrap();
        let price = Money::from_major(50);

        let applied = service
            .redeem_for_order(created.id, TargetType::Workers, price)
            .await
            .unwrap()
            .unwrap();
        service.release_redemption(&applied).await.unwrap();
        assert_eq!(service.require(created.id).await.unwrap().current_uses, 0);

        let again = service
            .redeem_for_order(created.id, TargetType::Workers, price)
            .await
            .unwrap();
        assert!(again.is_some());
    }
}
