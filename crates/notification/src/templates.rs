//! Confirmation message templates.

use domain::Assignment;
use store::{Customer, Order, Worker};

/// Which confirmation message an order gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVariant {
    /// Names the assigned worker and/or housemaid.
    WithWorkerDetails,
    /// Plain acceptance, used when no assignee could be resolved.
    AcceptanceOnly,
}

impl MessageVariant {
    pub fn for_assignment(assignment: &Assignment) -> Self {
        if assignment.has_staff() {
            MessageVariant::WithWorkerDetails
        } else {
            MessageVariant::AcceptanceOnly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageVariant::WithWorkerDetails => "with-worker-details",
            MessageVariant::AcceptanceOnly => "acceptance-only",
        }
    }
}

fn staff_line(role: &str, worker: &Worker) -> String {
    match &worker.phone {
        Some(phone) => format!("{role}: {} ({phone})", worker.name),
        None => format!("{role}: {}", worker.name),
    }
}

/// Renders the confirmation message for `order`.
pub fn render_confirmation(
    order: &Order,
    customer: &Customer,
    assignment: &Assignment,
) -> String {
    let greeting = match customer.name.as_deref() {
        Some(name) => format!("Hello {name},"),
        None => "Hello,".to_string(),
    };

    let mut lines = vec![
        greeting,
        format!(
            "your order {} for {} has been confirmed.",
            order.order_number, order.service_type
        ),
    ];

    match (order.date, order.time.as_deref()) {
        (Some(date), Some(time)) => lines.push(format!("Date: {date} at {time}")),
        (Some(date), None) => lines.push(format!("Date: {date}")),
        _ => {}
    }
    if let Some(address) = &order.address {
        lines.push(format!("Address: {address}"));
    }

    match MessageVariant::for_assignment(assignment) {
        MessageVariant::WithWorkerDetails => {
            if let Some(worker) = &assignment.worker {
                lines.push(staff_line("Worker", worker));
            }
            if let Some(housemaid) = &assignment.housemaid {
                lines.push(staff_line("Housemaid", housemaid));
            }
        }
        MessageVariant::AcceptanceOnly => {
            lines.push("We will share the assigned staff details with you shortly.".to_string());
        }
    }

    lines.push(format!("Amount: {}", order.amount));
    lines.push("Thank you for choosing us.".to_string());
    lines.join("\n")
}
