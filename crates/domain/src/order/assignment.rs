//! Attaches the selected worker and housemaid to an order on confirmation.

use store::{Order, Worker, WorkerId, WorkerRepository};

use crate::error::DomainError;

/// Staff resolved for an order's notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub worker: Option<Worker>,
    pub housemaid: Option<Worker>,
}

impl Assignment {
    /// True when at least one assignee resolved to a stored worker.
    pub fn has_staff(&self) -> bool {
        self.worker.is_some() || self.housemaid.is_some()
    }
}

fn add_unique(ids: &mut Vec<WorkerId>, id: WorkerId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// Loads the candidate for one role: the selected id, else the first
/// already-assigned id. Found candidates join the assignee set.
async fn resolve_candidate<W>(
    workers: &W,
    selected: Option<WorkerId>,
    assigned: &mut Vec<WorkerId>,
    role: &'static str,
) -> Result<Option<Worker>, DomainError>
where
    W: WorkerRepository + ?Sized,
{
    let Some(id) = selected.or_else(|| assigned.first().copied()) else {
        return Ok(None);
    };

    match workers.get_worker(id).await? {
        Some(worker) => {
            add_unique(assigned, worker.id);
            Ok(Some(worker))
        }
        None => {
            tracing::warn!(worker_id = %id, role, "assignee not found, skipping");
            Ok(None)
        }
    }
}

/// Adds the order's chosen worker and housemaid to its assignee sets.
///
/// Assignee lists behave as sets, so confirming twice never duplicates an
/// entry. A candidate with no stored worker is skipped and the order
/// proceeds without it.
pub async fn assign_workers<W>(workers: &W, order: &mut Order) -> Result<Assignment, DomainError>
where
    W: WorkerRepository + ?Sized,
{
    let worker = resolve_candidate(
        workers,
        order.selected_worker_id,
        &mut order.assigned_workers,
        "worker",
    )
    .await?;
    let housemaid = resolve_candidate(
        workers,
        order.selected_housemaid_id,
        &mut order.assigned_housemaids,
        "housemaid",
    )
    .await?;

    Ok(Assignment { worker, housemaid })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use store::{CustomerId, InMemoryStore, Money, OrderId, OrderStatus, WorkerKind};

    fn order() -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(),
            order_number: "ORD-1-1".to_string(),
            customer: CustomerId::new(),
            service_type: "regular".to_string(),
            date: None,
            time: None,
            address: None,
            city: None,
            district: None,
            notes: None,
            amount: Money::from_major(80),
            discount: None,
            status: OrderStatus::Confirmed,
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

    #[tokio::test]
    async fn assigns_selected_staff_once() {
        let store = InMemoryStore::new();
        let worker = Worker::new("Ahmed", WorkerKind::Worker, Utc::now()).with_phone("0550000001");
        let maid = Worker::new("Maria", WorkerKind::Housemaid, Utc::now());
        store.insert_worker(&worker).await.unwrap();
        store.insert_worker(&maid).await.unwrap();

        let mut o = order();
        o.selected_worker_id = Some(worker.id);
        o.selected_housemaid_id = Some(maid.id);

        let first = assign_workers(&store, &mut o).await.unwrap();
        let second = assign_workers(&store, &mut o).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.worker.as_ref().map(|w| w.id), Some(worker.id));
        assert_eq!(first.housemaid.as_ref().map(|w| w.id), Some(maid.id));
        assert_eq!(o.assigned_workers, vec![worker.id]);
        assert_eq!(o.assigned_housemaids, vec![maid.id]);
    }

    #[tokio::test]
    async fn missing_worker_is_skipped() {
        let store = InMemoryStore::new();

        let mut o = order();
        o.selected_worker_id = Some(WorkerId::new());

        let assignment = assign_workers(&store, &mut o).await.unwrap();
        assert!(!assignment.has_staff());
        assert!(o.assigned_workers.is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_first_assigned() {
        let store = InMemoryStore::new();
        let maid = Worker::new("Rosa", WorkerKind::Housemaid, Utc::now());
        store.insert_worker(&maid).await.unwrap();

        let mut o = order();
        o.assigned_housemaids = vec![maid.id];

        let assignment = assign_workers(&store, &mut o).await.unwrap();
        assert_eq!(assignment.housemaid.map(|w| w.name), Some("Rosa".to_string()));
        assert_eq!(o.assigned_housemaids, vec![maid.id]);
    }

    #[tokio::test]
    async fn nothing_selected_assigns_nothing() {
        let store = InMemoryStore::new();
        let mut o = order();

        let assignment = assign_workers(&store, &mut o).await.unwrap();
        assert_eq!(assignment, Assignment::default());
        assert!(o.assigned_workers.is_empty());
        assert!(o.assigned_housemaids.is_empty());
    }
}
