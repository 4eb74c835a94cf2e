//! Document storage for the cleaning back office.
//!
//! Each entity gets its own repository trait so the workflow code never
//! depends on a storage engine. Two engines are provided: an in-memory
//! store for development and tests, and PostgreSQL via `sqlx`.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod records;
pub mod repository;

pub use common::{
    CustomerId, DiscountId, DiscountType, Money, OrderId, OrderStatus, TargetType, WorkerId,
    WorkerKind,
};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{DiscountFilter, ListQuery, OrderFilter, Page};
pub use records::{AppliedDiscount, Customer, Discount, Order, Worker};
pub use repository::{
    CustomerRepository, DiscountRepository, OrderRepository, SequenceStore, Store,
    WorkerRepository,
};
