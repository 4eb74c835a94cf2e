use chrono::{DateTime, Utc};
use serde::Serialize;
use store::{Discount, DiscountType, Money};

use super::DiscountError;

/// Result of pricing an amount against a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountQuote {
    pub original_price: Money,
    pub discount_amount: Money,
    pub discounted_price: Money,
    /// False when the discount was not valid at the quoted instant.
    pub applied: bool,
}

impl DiscountQuote {
    fn unchanged(price: Money) -> Self {
        Self {
            original_price: price,
            discount_amount: Money::zero(),
            discounted_price: price,
            applied: false,
        }
    }
}

/// Whether `discount` can be used at `now`.
///
/// Requires the active flag, `startDate <= now <= endDate` (both bounds
/// inclusive) and, when a cap is set, remaining uses.
pub fn is_valid(discount: &Discount, now: DateTime<Utc>) -> bool {
    discount.is_active
        && discount.start_date <= now
        && now <= discount.end_date
        && discount
            .max_uses
            .is_none_or(|max| discount.current_uses < max)
}

/// Prices `price` against `discount` at `now`.
///
/// The discount amount never exceeds the price, so the discounted price
/// is never negative. An invalid discount leaves the price unchanged.
pub fn apply_discount(discount: &Discount, price: Money, now: DateTime<Utc>) -> DiscountQuote {
    if !is_valid(discount, now) || price.cents() <= 0 {
        return DiscountQuote::unchanged(price);
    }

    let raw = match discount.discount_type {
        DiscountType::Percentage => {
            let cents = (price.cents() as f64 * discount.discount_value / 100.0).round();
            Money::from_cents(cents as i64)
        }
        DiscountType::Fixed => Money::from_major_f64(discount.discount_value),
    };
    let discount_amount = Money::from_cents(raw.cents().clamp(0, price.cents()));

    DiscountQuote {
        original_price: price,
        discount_amount,
        discounted_price: price - discount_amount,
        applied: true,
    }
}

/// Checks a discount definition before it is stored.
pub fn validate_discount(discount: &Discount) -> Result<(), DiscountError> {
    if discount.name.trim().is_empty() {
        return Err(DiscountError::NameRequired);
    }
    if discount.end_date <= discount.start_date {
        return Err(DiscountError::InvalidDateRange {
            start: discount.start_date,
            end: discount.end_date,
        });
    }
    let value = discount.discount_value;
    if !value.is_finite() || value < 0.0 {
        return Err(DiscountError::InvalidValue { value });
    }
    if discount.discount_type == DiscountType::Percentage && value > 100.0 {
        return Err(DiscountError::PercentageOutOfRange { value });
    }
    if let Some(max) = discount.max_uses
        && max <= 0
    {
        return Err(DiscountError::InvalidMaxUses { value: max });
    }
    Ok(())
}
