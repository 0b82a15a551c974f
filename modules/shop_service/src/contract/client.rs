//! Native client trait for in-process callers
//!
//! This trait defines the API that screens and other modules use to interact
//! with the shop records. NO HTTP - direct function calls.
//!
//! Reads return `Ok(None)` for unknown ids. Updates and deletes return the
//! number of primary rows affected; an unknown id yields `Ok(0)`.

use super::{
    error::ShopError,
    model::{
        Customer, CustomerDraft, CustomerFilter, InvoiceDetails, InvoiceDraft, InvoiceFilter,
        Photo, PhotoDraft, PhotoParent, ScheduleEntry, ScheduleEntryDraft, TaskDetails,
        TaskDraft, TaskFilter, Vehicle, VehicleDraft, VehicleFilter, VehicleListing,
    },
};
use async_trait::async_trait;

/// Shop service API
#[async_trait]
pub trait ShopApi: Send + Sync {
    // ===== Customers =====

    /// Create a customer and return its id
    async fn add_customer(&self, draft: CustomerDraft) -> Result<String, ShopError>;

    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, ShopError>;

    /// Customers ordered by name
    async fn list_customers(&self, filter: CustomerFilter) -> Result<Vec<Customer>, ShopError>;

    async fn update_customer(&self, id: &str, draft: CustomerDraft) -> Result<u64, ShopError>;

    /// Delete a customer together with everything it owns
    async fn delete_customer(&self, id: &str) -> Result<u64, ShopError>;

    // ===== Vehicles =====

    async fn add_vehicle(&self, draft: VehicleDraft) -> Result<String, ShopError>;

    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, ShopError>;

    /// Vehicles with owner names, ordered by make then model
    async fn list_vehicles(&self, filter: VehicleFilter) -> Result<Vec<VehicleListing>, ShopError>;

    async fn update_vehicle(&self, id: &str, draft: VehicleDraft) -> Result<u64, ShopError>;

    /// Delete a vehicle with its tasks and everything attached to them
    async fn delete_vehicle(&self, id: &str) -> Result<u64, ShopError>;

    // ===== Tasks =====

    async fn add_task(&self, draft: TaskDraft) -> Result<String, ShopError>;

    async fn get_task(&self, id: &str) -> Result<Option<TaskDetails>, ShopError>;

    /// Tasks ordered by creation time, most recent first
    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskDetails>, ShopError>;

    async fn update_task(&self, id: &str, draft: TaskDraft) -> Result<u64, ShopError>;

    /// Delete a task; linked invoices survive but lose their line items
    async fn delete_task(&self, id: &str) -> Result<u64, ShopError>;

    // ===== Invoices =====

    async fn add_invoice(&self, draft: InvoiceDraft) -> Result<String, ShopError>;

    async fn get_invoice(&self, id: &str) -> Result<Option<InvoiceDetails>, ShopError>;

    /// Invoices ordered by issue date then invoice number, newest first
    async fn list_invoices(&self, filter: InvoiceFilter) -> Result<Vec<InvoiceDetails>, ShopError>;

    /// Replace the invoice header and its whole line-item collection
    async fn update_invoice(&self, id: &str, draft: InvoiceDraft) -> Result<u64, ShopError>;

    async fn delete_invoice(&self, id: &str) -> Result<u64, ShopError>;

    // ===== Photos =====

    async fn add_photo(&self, draft: PhotoDraft) -> Result<String, ShopError>;

    async fn list_photos(&self, parent: &PhotoParent) -> Result<Vec<Photo>, ShopError>;

    async fn update_photo_notes(&self, id: &str, notes: Option<String>) -> Result<u64, ShopError>;

    async fn delete_photo(&self, id: &str) -> Result<u64, ShopError>;

    // ===== Schedule =====

    async fn add_schedule_entry(&self, draft: ScheduleEntryDraft) -> Result<String, ShopError>;

    async fn list_schedule_entries(&self, task_id: &str) -> Result<Vec<ScheduleEntry>, ShopError>;
}
