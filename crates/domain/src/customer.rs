//! Customer resolution: find-or-create by phone, merging new contact details.

use chrono::Utc;
use store::{Customer, CustomerRepository};

use crate::error::DomainError;
use crate::order::OrderError;

/// Contact details supplied with an order or inquiry.
///
/// `phone` is the customer key. The other fields overwrite stored values
/// only when supplied and non-blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
}

impl ContactDetails {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_address(
        mut self,
        address: impl Into<String>,
        city: impl Into<String>,
        district: impl Into<String>,
    ) -> Self {
        self.address = Some(address.into());
        self.city = Some(city.into());
        self.district = Some(district.into());
        self
    }
}

/// Returns the trimmed value if it was supplied and is not blank.
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Overwrites `target` if `value` was supplied and differs. Returns true on change.
fn merge_field(target: &mut Option<String>, value: &Option<String>) -> bool {
    match supplied(value) {
        Some(v) if target.as_deref() != Some(v) => {
            *target = Some(v.to_string());
            true
        }
        _ => false,
    }
}

/// Applies supplied contact fields to a customer. Returns true if anything changed.
fn merge_contact(customer: &mut Customer, contact: &ContactDetails) -> bool {
    let mut changed = false;
    changed |= merge_field(&mut customer.name, &contact.name);
    changed |= merge_field(&mut customer.email, &contact.email);
    changed |= merge_field(&mut customer.address, &contact.address);
    changed |= merge_field(&mut customer.city, &contact.city);
    changed |= merge_field(&mut customer.district, &contact.district);
    changed
}

/// Finds or creates customers keyed by phone number.
#[derive(Clone)]
pub struct CustomerResolver<R> {
    repo: R,
}

impl<R: CustomerRepository> CustomerResolver<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the customer owning `contact.phone`, creating it if needed.
    ///
    /// A concurrent creation of the same phone surfaces from the store as a
    /// duplicate key; that case is retried as a lookup and merged.
    #[tracing::instrument(skip_all)]
    pub async fn resolve(&self, contact: &ContactDetails) -> Result<Customer, DomainError> {
        let phone = contact.phone.trim();
        if phone.is_empty() {
            return Err(OrderError::PhoneRequired.into());
        }

        if let Some(existing) = self.repo.find_customer_by_phone(phone).await? {
            return self.merge_existing(existing, contact).await;
        }

        let mut customer = Customer::new(phone, Utc::now());
        merge_contact(&mut customer, contact);

        match self.repo.insert_customer(&customer).await {
            Ok(()) => {
                tracing::debug!(customer_id = %customer.id, "customer created");
                Ok(customer)
            }
            Err(err) if err.is_duplicate() => {
                tracing::debug!("customer created concurrently, retrying as lookup");
                let existing = self
                    .repo
                    .find_customer_by_phone(phone)
                    .await?
                    .ok_or(DomainError::Store(err))?;
                self.merge_existing(existing, contact).await
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn merge_existing(
        &self,
        mut customer: Customer,
        contact: &ContactDetails,
    ) -> Result<Customer, DomainError> {
        if merge_contact(&mut customer, contact) {
            customer.updated_at = Utc::now();
            self.repo.update_customer(&customer).await?;
        }
        Ok(customer)
    }
}
