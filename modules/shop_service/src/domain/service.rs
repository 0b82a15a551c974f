//! Domain service - business logic orchestration

use crate::config::TaskDeletePolicy;
use crate::contract::{
    Customer, CustomerDraft, CustomerFilter, InvoiceDetails, InvoiceDraft, InvoiceFilter,
    PaymentStatus, Photo, PhotoDraft, PhotoParent, ScheduleEntry, ScheduleEntryDraft, ShopError,
    TaskDetails, TaskDraft, TaskFilter, Vehicle, VehicleDraft, VehicleFilter, VehicleListing,
};
use chrono::Utc;
use sea_orm::{DbErr, SqlErr};
use std::sync::Arc;

use super::repository::{
    CustomerRepository, InvoiceRepository, PhotoRepository, ScheduleRepository, TaskRepository,
    VehicleRepository,
};
use super::validation;

/// Storage handles the service delegates to
#[derive(Clone)]
pub struct Repositories {
    pub customers: Arc<dyn CustomerRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub photos: Arc<dyn PhotoRepository>,
    pub schedule: Arc<dyn ScheduleRepository>,
}

/// Convert a storage failure, logging it once
fn storage_error(operation: &'static str, err: anyhow::Error) -> ShopError {
    let cause = format!("{err:#}");
    let constraint = err
        .chain()
        .filter_map(|e| e.downcast_ref::<DbErr>())
        .any(|e| {
            matches!(
                e.sql_err(),
                Some(SqlErr::UniqueConstraintViolation(_))
                    | Some(SqlErr::ForeignKeyConstraintViolation(_))
            )
        });

    tracing::error!(operation, error = %cause, "Storage operation failed");

    if constraint {
        ShopError::ConstraintViolation { cause }
    } else {
        ShopError::Persistence { cause }
    }
}

trait StorageResultExt<T> {
    fn storage(self, operation: &'static str) -> Result<T, ShopError>;
}

impl<T> StorageResultExt<T> for anyhow::Result<T> {
    fn storage(self, operation: &'static str) -> Result<T, ShopError> {
        self.map_err(|err| storage_error(operation, err))
    }
}

/// Domain service for the shop records
pub struct Service {
    repos: Repositories,
    task_delete_policy: TaskDeletePolicy,
}

impl Service {
    /// Create a new service instance
    pub fn new(repos: Repositories, task_delete_policy: TaskDeletePolicy) -> Self {
        Self {
            repos,
            task_delete_policy,
        }
    }

    // ===== Reference checks =====

    async fn ensure_customer(&self, id: &str) -> Result<(), ShopError> {
        if !self.repos.customers.exists(id).await.storage("check customer")? {
            return Err(ShopError::not_found("customer", id));
        }
        Ok(())
    }

    async fn ensure_vehicle(&self, id: &str) -> Result<(), ShopError> {
        if !self.repos.vehicles.exists(id).await.storage("check vehicle")? {
            return Err(ShopError::not_found("vehicle", id));
        }
        Ok(())
    }

    async fn ensure_task(&self, id: &str) -> Result<(), ShopError> {
        if !self.repos.tasks.exists(id).await.storage("check task")? {
            return Err(ShopError::not_found("task", id));
        }
        Ok(())
    }

    async fn ensure_photo_parent(&self, parent: &PhotoParent) -> Result<(), ShopError> {
        match parent {
            PhotoParent::Customer(id) => self.ensure_customer(id).await,
            PhotoParent::Vehicle(id) => self.ensure_vehicle(id).await,
            PhotoParent::Task(id) => self.ensure_task(id).await,
        }
    }

    async fn ensure_task_refs(
        &self,
        customer_id: Option<&str>,
        vehicle_id: Option<&str>,
    ) -> Result<(), ShopError> {
        if let Some(customer_id) = customer_id {
            self.ensure_customer(customer_id).await?;
        }
        if let Some(vehicle_id) = vehicle_id {
            self.ensure_vehicle(vehicle_id).await?;
        }
        Ok(())
    }

    async fn ensure_invoice_refs(
        &self,
        customer_id: &str,
        task_id: Option<&str>,
    ) -> Result<(), ShopError> {
        self.ensure_customer(customer_id).await?;
        if let Some(task_id) = task_id {
            self.ensure_task(task_id).await?;
        }
        Ok(())
    }

    // ===== Customers =====

    pub async fn add_customer(&self, draft: CustomerDraft) -> Result<String, ShopError> {
        let id = validation::record_id(draft.id.clone())?;
        let customer = validation::customer(id, draft)?;

        self.repos
            .customers
            .create(&customer)
            .await
            .storage("add customer")?;

        tracing::debug!(customer_id = %customer.id, "Customer added");
        Ok(customer.id)
    }

    pub async fn get_customer(&self, id: &str) -> Result<Option<Customer>, ShopError> {
        self.repos.customers.find_by_id(id).await.storage("get customer")
    }

    pub async fn list_customers(&self, filter: CustomerFilter) -> Result<Vec<Customer>, ShopError> {
        let filter = CustomerFilter {
            name: validation::optional(filter.name),
        };
        self.repos.customers.list(&filter).await.storage("list customers")
    }

    pub async fn update_customer(&self, id: &str, draft: CustomerDraft) -> Result<u64, ShopError> {
        let customer = validation::customer(id.to_string(), draft)?;
        self.repos
            .customers
            .update(&customer)
            .await
            .storage("update customer")
    }

    pub async fn delete_customer(&self, id: &str) -> Result<u64, ShopError> {
        let rows = self
            .repos
            .customers
            .delete(id)
            .await
            .storage("delete customer")?;

        tracing::debug!(customer_id = id, rows, "Customer deleted");
        Ok(rows)
    }

    // ===== Vehicles =====

    pub async fn add_vehicle(&self, draft: VehicleDraft) -> Result<String, ShopError> {
        let id = validation::record_id(draft.id.clone())?;
        let vehicle = validation::vehicle(id, draft)?;
        self.ensure_customer(&vehicle.customer_id).await?;

        self.repos
            .vehicles
            .create(&vehicle)
            .await
            .storage("add vehicle")?;

        tracing::debug!(vehicle_id = %vehicle.id, customer_id = %vehicle.customer_id, "Vehicle added");
        Ok(vehicle.id)
    }

    pub async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, ShopError> {
        self.repos.vehicles.find_by_id(id).await.storage("get vehicle")
    }

    pub async fn list_vehicles(
        &self,
        filter: VehicleFilter,
    ) -> Result<Vec<VehicleListing>, ShopError> {
        let filter = VehicleFilter {
            customer_id: validation::optional(filter.customer_id),
            make: validation::optional(filter.make),
            model: validation::optional(filter.model),
        };
        self.repos.vehicles.list(&filter).await.storage("list vehicles")
    }

    pub async fn update_vehicle(&self, id: &str, draft: VehicleDraft) -> Result<u64, ShopError> {
        let vehicle = validation::vehicle(id.to_string(), draft)?;
        if !self.repos.vehicles.exists(id).await.storage("check vehicle")? {
            return Ok(0);
        }
        self.ensure_customer(&vehicle.customer_id).await?;

        self.repos
            .vehicles
            .update(&vehicle)
            .await
            .storage("update vehicle")
    }

    pub async fn delete_vehicle(&self, id: &str) -> Result<u64, ShopError> {
        let rows = self
            .repos
            .vehicles
            .delete(id)
            .await
            .storage("delete vehicle")?;

        tracing::debug!(vehicle_id = id, rows, "Vehicle deleted");
        Ok(rows)
    }

    // ===== Tasks =====

    pub async fn add_task(&self, draft: TaskDraft) -> Result<String, ShopError> {
        let id = validation::record_id(draft.id.clone())?;
        let task = validation::task(id, draft, Utc::now())?;
        self.ensure_task_refs(task.customer_id.as_deref(), task.vehicle_id.as_deref())
            .await?;

        self.repos.tasks.create(&task).await.storage("add task")?;

        tracing::debug!(task_id = %task.id, status = %task.status, "Task added");
        Ok(task.id)
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<TaskDetails>, ShopError> {
        self.repos.tasks.find_by_id(id).await.storage("get task")
    }

    pub async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<TaskDetails>, ShopError> {
        let filter = TaskFilter {
            customer_id: validation::optional(filter.customer_id),
            vehicle_id: validation::optional(filter.vehicle_id),
            ..filter
        };
        self.repos.tasks.list(&filter).await.storage("list tasks")
    }

    pub async fn update_task(&self, id: &str, draft: TaskDraft) -> Result<u64, ShopError> {
        // The repository keeps the stored creation time
        let task = validation::task(id.to_string(), draft, Utc::now())?;
        if !self.repos.tasks.exists(id).await.storage("check task")? {
            return Ok(0);
        }
        self.ensure_task_refs(task.customer_id.as_deref(), task.vehicle_id.as_deref())
            .await?;

        self.repos.tasks.update(&task).await.storage("update task")
    }

    pub async fn delete_task(&self, id: &str) -> Result<u64, ShopError> {
        if self.task_delete_policy == TaskDeletePolicy::RejectIfPaid {
            let paid = self
                .repos
                .invoices
                .list(&InvoiceFilter {
                    task_id: Some(id.to_string()),
                    payment_status: Some(PaymentStatus::Paid),
                    ..Default::default()
                })
                .await
                .storage("check paid invoices")?;

            if let Some(details) = paid.first() {
                tracing::warn!(
                    task_id = id,
                    invoice_id = %details.invoice.id,
                    "Refusing to delete task with a paid invoice"
                );
                return Err(ShopError::Conflict {
                    reason: format!(
                        "task {} has paid invoice {}",
                        id, details.invoice.id
                    ),
                });
            }
        }

        let rows = self.repos.tasks.delete(id).await.storage("delete task")?;

        tracing::debug!(task_id = id, rows, "Task deleted");
        Ok(rows)
    }

    // ===== Invoices =====

    pub async fn add_invoice(&self, draft: InvoiceDraft) -> Result<String, ShopError> {
        let id = validation::record_id(draft.id.clone())?;
        let invoice = validation::invoice(id, draft)?;
        self.ensure_invoice_refs(&invoice.customer_id, invoice.task_id.as_deref())
            .await?;

        self.repos
            .invoices
            .create(&invoice)
            .await
            .storage("add invoice")?;

        tracing::debug!(
            invoice_id = %invoice.id,
            total = %invoice.total_amount,
            "Invoice added"
        );
        Ok(invoice.id)
    }

    pub async fn get_invoice(&self, id: &str) -> Result<Option<InvoiceDetails>, ShopError> {
        self.repos.invoices.find_by_id(id).await.storage("get invoice")
    }

    pub async fn list_invoices(
        &self,
        filter: InvoiceFilter,
    ) -> Result<Vec<InvoiceDetails>, ShopError> {
        let filter = InvoiceFilter {
            customer_id: validation::optional(filter.customer_id),
            task_id: validation::optional(filter.task_id),
            ..filter
        };
        self.repos.invoices.list(&filter).await.storage("list invoices")
    }

    pub async fn update_invoice(&self, id: &str, draft: InvoiceDraft) -> Result<u64, ShopError> {
        let invoice = validation::invoice(id.to_string(), draft)?;
        if !self.repos.invoices.exists(id).await.storage("check invoice")? {
            return Ok(0);
        }
        self.ensure_invoice_refs(&invoice.customer_id, invoice.task_id.as_deref())
            .await?;

        self.repos
            .invoices
            .update(&invoice)
            .await
            .storage("update invoice")
    }

    pub async fn delete_invoice(&self, id: &str) -> Result<u64, ShopError> {
        let rows = self
            .repos
            .invoices
            .delete(id)
            .await
            .storage("delete invoice")?;

        tracing::debug!(invoice_id = id, rows, "Invoice deleted");
        Ok(rows)
    }

    // ===== Photos =====

    pub async fn add_photo(&self, draft: PhotoDraft) -> Result<String, ShopError> {
        let id = validation::record_id(draft.id.clone())?;
        let photo = validation::photo(id, draft)?;
        self.ensure_photo_parent(&photo.parent).await?;

        self.repos.photos.create(&photo).await.storage("add photo")?;
        Ok(photo.id)
    }

    pub async fn list_photos(&self, parent: &PhotoParent) -> Result<Vec<Photo>, ShopError> {
        self.repos
            .photos
            .list_for_parent(parent)
            .await
            .storage("list photos")
    }

    pub async fn update_photo_notes(
        &self,
        id: &str,
        notes: Option<String>,
    ) -> Result<u64, ShopError> {
        self.repos
            .photos
            .update_notes(id, validation::optional(notes))
            .await
            .storage("update photo notes")
    }

    pub async fn delete_photo(&self, id: &str) -> Result<u64, ShopError> {
        self.repos.photos.delete(id).await.storage("delete photo")
    }

    // ===== Schedule =====

    pub async fn add_schedule_entry(&self, draft: ScheduleEntryDraft) -> Result<String, ShopError> {
        let id = validation::record_id(draft.id.clone())?;
        let entry = validation::schedule_entry(id, draft);
        if let Some(task_id) = &entry.task_id {
            self.ensure_task(task_id).await?;
        }

        self.repos
            .schedule
            .create(&entry)
            .await
            .storage("add schedule entry")?;
        Ok(entry.id)
    }

    pub async fn list_schedule_entries(
        &self,
        task_id: &str,
    ) -> Result<Vec<ScheduleEntry>, ShopError> {
        self.repos
            .schedule
            .list_for_task(task_id)
            .await
            .storage("list schedule entries")
    }
}
