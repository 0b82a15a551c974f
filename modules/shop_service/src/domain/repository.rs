//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs
//!
//! Every `delete` removes the row together with everything it owns and
//! returns the number of primary rows removed.

use crate::contract::{
    Customer, CustomerFilter, Invoice, InvoiceDetails, InvoiceFilter, Photo, PhotoParent,
    ScheduleEntry, Task, TaskDetails, TaskFilter, Vehicle, VehicleFilter, VehicleListing,
};
use anyhow::Result;
use async_trait::async_trait;

/// Repository for customers
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: &Customer) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>>;

    async fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>>;

    /// Write changed fields; 0 when unknown or unchanged
    async fn update(&self, customer: &Customer) -> Result<u64>;

    async fn delete(&self, id: &str) -> Result<u64>;

    async fn exists(&self, id: &str) -> Result<bool>;
}

/// Repository for vehicles
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn create(&self, vehicle: &Vehicle) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Vehicle>>;

    /// Vehicles joined with their owner
    async fn list(&self, filter: &VehicleFilter) -> Result<Vec<VehicleListing>>;

    async fn update(&self, vehicle: &Vehicle) -> Result<u64>;

    async fn delete(&self, id: &str) -> Result<u64>;

    async fn exists(&self, id: &str) -> Result<bool>;
}

/// Repository for tasks
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<TaskDetails>>;

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskDetails>>;

    /// Write changed fields, never `created_date`
    async fn update(&self, task: &Task) -> Result<u64>;

    /// Linked invoices are kept with `task_id` cleared; their line items go
    async fn delete(&self, id: &str) -> Result<u64>;

    async fn exists(&self, id: &str) -> Result<bool>;
}

/// Repository for invoices and their line items
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Insert header and items atomically
    async fn create(&self, invoice: &Invoice) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<InvoiceDetails>>;

    async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<InvoiceDetails>>;

    /// Update the header and replace the items atomically.
    ///
    /// Returns 1 when the header or the items changed, 0 when neither did.
    async fn update(&self, invoice: &Invoice) -> Result<u64>;

    async fn delete(&self, id: &str) -> Result<u64>;

    async fn exists(&self, id: &str) -> Result<bool>;
}

/// Repository for photos
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn create(&self, photo: &Photo) -> Result<()>;

    /// Photos of one parent in insertion order
    async fn list_for_parent(&self, parent: &PhotoParent) -> Result<Vec<Photo>>;

    async fn update_notes(&self, id: &str, notes: Option<String>) -> Result<u64>;

    async fn delete(&self, id: &str) -> Result<u64>;
}

/// Repository for schedule entries
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, entry: &ScheduleEntry) -> Result<()>;

    /// Entries of one task by job date then start time
    async fn list_for_task(&self, task_id: &str) -> Result<Vec<ScheduleEntry>>;
}
