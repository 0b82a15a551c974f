//! Contract models for the shop service
//!
//! These models are transport-agnostic and used for in-process communication.
//! NO serde derives - these are pure domain models.
//!
//! Every entity comes in two shapes: the stored record, and a `*Draft` that
//! callers hand to `add_*` / `update_*`. Drafts carry an optional caller-chosen
//! id which `update_*` ignores.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use super::error::ShopError;

// ===== Customers =====

/// Shop customer, root of the ownership graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDraft {
    /// Pre-assigned id; generated when absent
    pub id: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Customer listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    /// Case-insensitive substring of the customer name
    pub name: Option<String>,
}

// ===== Vehicles =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: String,
    pub customer_id: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    /// Unique across all vehicles when present
    pub vin: Option<String>,
    pub engine_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleDraft {
    pub id: Option<String>,
    pub customer_id: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub engine_type: Option<String>,
}

/// Vehicle joined with its owner's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleListing {
    pub vehicle: Vehicle,
    pub customer_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleFilter {
    pub customer_id: Option<String>,
    /// Case-insensitive substring of the make
    pub make: Option<String>,
    /// Case-insensitive substring of the model
    pub model: Option<String>,
}

// ===== Tasks =====

/// Kind of work a task represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCategory {
    Repairs,
    Maintenance,
    Diagnostics,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 3] = [Self::Repairs, Self::Maintenance, Self::Diagnostics];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repairs => "Repairs",
            Self::Maintenance => "Maintenance",
            Self::Diagnostics => "Diagnostics",
        }
    }
}

/// Workflow state of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    AwaitingParts,
    OnHold,
    Completed,
    Cancelled,
    RequiresFollowUp,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 7] = [
        Self::ToDo,
        Self::InProgress,
        Self::AwaitingParts,
        Self::OnHold,
        Self::Completed,
        Self::Cancelled,
        Self::RequiresFollowUp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::AwaitingParts => "Awaiting Parts",
            Self::OnHold => "On Hold",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::RequiresFollowUp => "Requires Follow-up",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub vehicle_id: Option<String>,
    pub customer_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<TaskCategory>,
    pub status: TaskStatus,
    /// Stamped by the store at creation, never updated
    pub created_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub id: Option<String>,
    pub vehicle_id: Option<String>,
    pub customer_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<TaskCategory>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

/// Vehicle fields shown next to a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleSummary {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub engine_type: Option<String>,
}

/// Task with optional customer and vehicle context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    pub task: Task,
    pub customer_name: Option<String>,
    pub vehicle: Option<VehicleSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub customer_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
}

// ===== Invoices =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [Self::Pending, Self::Paid, Self::Cancelled];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLineItem {
    pub id: String,
    pub invoice_id: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// quantity x unit_price, fixed when the item was written
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemDraft {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl LineItemDraft {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub task_id: Option<String>,
    pub invoice_number: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    /// Sum of `line_items[*].total_price`
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    /// In the order they were supplied
    pub line_items: Vec<InvoiceLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub id: Option<String>,
    pub customer_id: String,
    pub task_id: Option<String>,
    pub invoice_number: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub line_items: Vec<LineItemDraft>,
}

/// Invoice with customer name and source task title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDetails {
    pub invoice: Invoice,
    pub customer_name: String,
    pub task_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub customer_id: Option<String>,
    pub task_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

// ===== Schedule =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub id: String,
    pub task_id: Option<String>,
    pub job_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleEntryDraft {
    pub id: Option<String>,
    pub task_id: Option<String>,
    pub job_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

// ===== Photos =====

/// Owner of a photo
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhotoParent {
    Customer(String),
    Vehicle(String),
    Task(String),
}

/// Discriminator stored next to the parent id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotoParentKind {
    Customer,
    Vehicle,
    Task,
}

impl PhotoParentKind {
    pub const ALL: [PhotoParentKind; 3] = [Self::Customer, Self::Vehicle, Self::Task];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vehicle => "vehicle",
            Self::Task => "task",
        }
    }
}

impl PhotoParent {
    pub fn kind(&self) -> PhotoParentKind {
        match self {
            Self::Customer(_) => PhotoParentKind::Customer,
            Self::Vehicle(_) => PhotoParentKind::Vehicle,
            Self::Task(_) => PhotoParentKind::Task,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Customer(id) | Self::Vehicle(id) | Self::Task(id) => id,
        }
    }

    pub fn new(kind: PhotoParentKind, id: impl Into<String>) -> Self {
        let id = id.into();
        match kind {
            PhotoParentKind::Customer => Self::Customer(id),
            PhotoParentKind::Vehicle => Self::Vehicle(id),
            PhotoParentKind::Task => Self::Task(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: String,
    pub parent: PhotoParent,
    /// Location of the image in platform storage
    pub uri: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoDraft {
    pub id: Option<String>,
    pub parent: PhotoParent,
    pub uri: String,
    pub notes: Option<String>,
}

// ===== String forms =====

macro_rules! string_enum {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ShopError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| ShopError::Validation {
                        message: format!("unknown {} '{}'", $what, s),
                    })
            }
        }
    };
}

string_enum!(TaskCategory, "task category");
string_enum!(TaskStatus, "task status");
string_enum!(PaymentStatus, "payment status");
string_enum!(PhotoParentKind, "photo parent type");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_round_trips_display_strings() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert_eq!("Requires Follow-up".parse::<TaskStatus>().unwrap(), TaskStatus::RequiresFollowUp);
    }

    #[test]
    fn test_unknown_strings_are_rejected() {
        assert!("Done".parse::<TaskStatus>().is_err());
        assert!("to do".parse::<TaskStatus>().is_err());
        assert!("Unpaid".parse::<PaymentStatus>().is_err());
        assert!("invoice".parse::<PhotoParentKind>().is_err());
    }

    #[test]
    fn test_photo_parent_kind_and_id() {
        let parent = PhotoParent::Vehicle("v1".to_string());
        assert_eq!(parent.kind(), PhotoParentKind::Vehicle);
        assert_eq!(parent.id(), "v1");
        assert_eq!(PhotoParent::new(PhotoParentKind::Task, "t1"), PhotoParent::Task("t1".to_string()));
    }
}
