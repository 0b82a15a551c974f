//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    Customer, CustomerDraft, CustomerFilter, InvoiceDetails, InvoiceDraft, InvoiceFilter, Photo,
    PhotoDraft, PhotoParent, ScheduleEntry, ScheduleEntryDraft, ShopApi, ShopError, TaskDetails,
    TaskDraft, TaskFilter, Vehicle, VehicleDraft, VehicleFilter, VehicleListing,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client implementation that directly calls the domain service
///
/// Cheap to clone; every clone shares the same store handle.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ShopApi for NativeClient {
    async fn add_customer(&self, draft: CustomerDraft) -> Result<String, ShopError> {
        self.service.add_customer(draft).await
    }

    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, ShopError> {
        self.service.get_customer(id).await
    }

    async fn list_customers(&self, filter: CustomerFilter) -> Result<Vec<Customer>, ShopError> {
        self.service.list_customers(filter).await
    }

    async fn update_customer(&self, id: &str, draft: CustomerDraft) -> Result<u64, ShopError> {
        self.service.update_customer(id, draft).await
    }

    async fn delete_customer(&self, id: &str) -> Result<u64, ShopError> {
        self.service.delete_customer(id).await
    }

    async fn add_vehicle(&self, draft: VehicleDraft) -> Result<String, ShopError> {
        self.service.add_vehicle(draft).await
    }

    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, ShopError> {
        self.service.get_vehicle(id).await
    }

    async fn list_vehicles(&self, filter: VehicleFilter) -> Result<Vec<VehicleListing>, ShopError> {
        self.service.list_vehicles(filter).await
    }

    async fn update_vehicle(&self, id: &str, draft: VehicleDraft) -> Result<u64, ShopError> {
        self.service.update_vehicle(id, draft).await
    }

    async fn delete_vehicle(&self, id: &str) -> Result<u64, ShopError> {
        self.service.delete_vehicle(id).await
    }

    async fn add_task(&self, draft: TaskDraft) -> Result<String, ShopError> {
        self.service.add_task(draft).await
    }

    async fn get_task(&self, id: &str) -> Result<Option<TaskDetails>, ShopError> {
        self.service.get_task(id).await
    }

    async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskDetails>, ShopError> {
        self.service.list_tasks(filter).await
    }

    async fn update_task(&self, id: &str, draft: TaskDraft) -> Result<u64, ShopError> {
        self.service.update_task(id, draft).await
    }

    async fn delete_task(&self, id: &str) -> Result<u64, ShopError> {
        self.service.delete_task(id).await
    }

    async fn add_invoice(&self, draft: InvoiceDraft) -> Result<String, ShopError> {
        self.service.add_invoice(draft).await
    }

    async fn get_invoice(&self, id: &str) -> Result<Option<InvoiceDetails>, ShopError> {
        self.service.get_invoice(id).await
    }

    async fn list_invoices(&self, filter: InvoiceFilter) -> Result<Vec<InvoiceDetails>, ShopError> {
        self.service.list_invoices(filter).await
    }

    async fn update_invoice(&self, id: &str, draft: InvoiceDraft) -> Result<u64, ShopError> {
        self.service.update_invoice(id, draft).await
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, ShopError> {
        self.service.delete_invoice(id).await
    }

    async fn add_photo(&self, draft: PhotoDraft) -> Result<String, ShopError> {
        self.service.add_photo(draft).await
    }

    async fn list_photos(&self, parent: &PhotoParent) -> Result<Vec<Photo>, ShopError> {
        self.service.list_photos(parent).await
    }

    async fn update_photo_notes(&self, id: &str, notes: Option<String>) -> Result<u64, ShopError> {
        self.service.update_photo_notes(id, notes).await
    }

    async fn delete_photo(&self, id: &str) -> Result<u64, ShopError> {
        self.service.delete_photo(id).await
    }

    async fn add_schedule_entry(&self, draft: ScheduleEntryDraft) -> Result<String, ShopError> {
        self.service.add_schedule_entry(draft).await
    }

    async fn list_schedule_entries(&self, task_id: &str) -> Result<Vec<ScheduleEntry>, ShopError> {
        self.service.list_schedule_entries(task_id).await
    }
}
