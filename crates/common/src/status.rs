use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// The status of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Confirmed ──► InProgress ──► Done
///    │            │             │
///    └────────────┴─────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Newly placed, awaiting staff review.
    #[default]
    Pending,

    /// Accepted by staff; the customer is notified on entry.
    Confirmed,

    /// A worker is on site.
    InProgress,

    /// Service delivered (terminal state).
    Done,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if an explicit confirm action is accepted in this state.
    ///
    /// Re-confirming a confirmed order is allowed so a failed notification
    /// can be retried.
    pub fn can_confirm(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Returns true if the order can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Done | OrderStatus::Cancelled)
    }

    /// Returns true if moving from this state to `target` is a legal transition.
    ///
    /// Staying in the same state is not a transition and returns false.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        match (self, target) {
            (current, OrderStatus::Cancelled) => current.can_cancel(),
            (OrderStatus::Pending, OrderStatus::Confirmed) => true,
            (OrderStatus::Confirmed, OrderStatus::InProgress) => true,
            (OrderStatus::InProgress, OrderStatus::Done) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Done => "done",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "in-progress" => Ok(OrderStatus::InProgress),
            "done" => Ok(OrderStatus::Done),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseEnumError {
                kind: "order status",
                value: other.to_string(),
            }),
        }
    }
}

/// How a discount's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discountValue` is a percentage in `0..=100`.
    Percentage,
    /// `discountValue` is a flat amount in major currency units.
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiscountType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(ParseEnumError {
                kind: "discount type",
                value: other.to_string(),
            }),
        }
    }
}

/// Which kind of booking a discount applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// Housemaid (assistant) bookings.
    Assistants,
    /// Cleaning worker bookings.
    Workers,
    /// Every booking.
    #[default]
    All,
}

impl TargetType {
    /// Returns true if a discount targeting `self` applies to a `query` lookup.
    ///
    /// `All` is a wildcard on the discount side: it matches every query in
    /// addition to exact matches.
    pub fn matches(&self, query: TargetType) -> bool {
        *self == TargetType::All || *self == query
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Assistants => "assistants",
            TargetType::Workers => "workers",
            TargetType::All => "all",
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assistants" => Ok(TargetType::Assistants),
            "workers" => Ok(TargetType::Workers),
            "all" => Ok(TargetType::All),
            other => Err(ParseEnumError {
                kind: "target type",
                value: other.to_string(),
            }),
        }
    }
}

/// Kind of staff member that can be assigned to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Worker,
    Housemaid,
}

impl WorkerKind {
    /// The discount target that covers bookings of this kind.
    pub fn target_type(&self) -> TargetType {
        match self {
            WorkerKind::Worker => TargetType::Workers,
            WorkerKind::Housemaid => TargetType::Assistants,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerKind::Worker => "worker",
            WorkerKind::Housemaid => "housemaid",
        }
    }
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkerKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worker" => Ok(WorkerKind::Worker),
            "housemaid" => Ok(WorkerKind::Housemaid),
            other => Err(ParseEnumError {
                kind: "worker kind",
                value: other.to_string(),
            }),
        }
    }
}
