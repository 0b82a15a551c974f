//! Entity to model mappers
//!
//! Conversions between SeaORM entities / joined rows and contract models

use crate::contract::{
    Customer, Invoice, InvoiceDetails, InvoiceLineItem, PaymentStatus, Photo, PhotoParent,
    PhotoParentKind, ScheduleEntry, Task, TaskCategory, TaskDetails, TaskStatus, Vehicle,
    VehicleListing, VehicleSummary,
};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::Set, FromQueryResult};

use super::entity::{
    customer, invoice, invoice_line_item, photo, schedule_entry, task, vehicle,
};

// ===== Joined rows =====

/// `vehicles` joined with the owner's name
#[derive(Debug, Clone, FromQueryResult)]
pub struct VehicleRow {
    pub id: String,
    pub customer_id: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub engine_type: Option<String>,
    pub customer_name: String,
}

/// `tasks` left-joined with customer and vehicle
#[derive(Debug, Clone, FromQueryResult)]
pub struct TaskRow {
    pub id: String,
    pub vehicle_id: Option<String>,
    pub customer_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub created_date: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub customer_name: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub vehicle_year: Option<i32>,
    pub vehicle_vin: Option<String>,
    pub vehicle_engine_type: Option<String>,
}

/// `invoices` joined with customer, left-joined with task
#[derive(Debug, Clone, FromQueryResult)]
pub struct InvoiceRow {
    pub id: String,
    pub customer_id: String,
    pub task_id: Option<String>,
    pub invoice_number: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub payment_status: String,
    pub notes: Option<String>,
    pub customer_name: String,
    pub task_title: Option<String>,
}

// ===== Customers =====

impl From<customer::Model> for Customer {
    fn from(entity: customer::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            phone: entity.phone,
            email: entity.email,
            address: entity.address,
        }
    }
}

impl From<&Customer> for customer::Model {
    fn from(model: &Customer) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            phone: model.phone.clone(),
            email: model.email.clone(),
            address: model.address.clone(),
        }
    }
}

// ===== Vehicles =====

impl From<vehicle::Model> for Vehicle {
    fn from(entity: vehicle::Model) -> Self {
        Self {
            id: entity.id,
            customer_id: entity.customer_id,
            make: entity.make,
            model: entity.model,
            year: entity.year,
            vin: entity.vin,
            engine_type: entity.engine_type,
        }
    }
}

impl From<&Vehicle> for vehicle::Model {
    fn from(model: &Vehicle) -> Self {
        Self {
            id: model.id.clone(),
            customer_id: model.customer_id.clone(),
            make: model.make.clone(),
            model: model.model.clone(),
            year: model.year,
            vin: model.vin.clone(),
            engine_type: model.engine_type.clone(),
        }
    }
}

impl From<VehicleRow> for VehicleListing {
    fn from(row: VehicleRow) -> Self {
        Self {
            vehicle: Vehicle {
                id: row.id,
                customer_id: row.customer_id,
                make: row.make,
                model: row.model,
                year: row.year,
                vin: row.vin,
                engine_type: row.engine_type,
            },
            customer_name: row.customer_name,
        }
    }
}

// ===== Tasks =====

fn parse_category(value: Option<String>) -> anyhow::Result<Option<TaskCategory>> {
    value
        .map(|s| s.parse::<TaskCategory>().context("stored task category"))
        .transpose()
}

impl TryFrom<task::Model> for Task {
    type Error = anyhow::Error;

    fn try_from(entity: task::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            category: parse_category(entity.category)?,
            status: entity.status.parse::<TaskStatus>().context("stored task status")?,
            id: entity.id,
            vehicle_id: entity.vehicle_id,
            customer_id: entity.customer_id,
            title: entity.title,
            description: entity.description,
            created_date: entity.created_date,
            due_date: entity.due_date,
        })
    }
}

impl From<&Task> for task::Model {
    fn from(model: &Task) -> Self {
        Self {
            id: model.id.clone(),
            vehicle_id: model.vehicle_id.clone(),
            customer_id: model.customer_id.clone(),
            title: model.title.clone(),
            description: model.description.clone(),
            category: model.category.map(|c| c.as_str().to_string()),
            status: model.status.as_str().to_string(),
            created_date: model.created_date,
            due_date: model.due_date,
        }
    }
}

impl TryFrom<TaskRow> for TaskDetails {
    type Error = anyhow::Error;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        // A task without a vehicle has every vehicle column NULL
        let vehicle = row.vehicle_id.as_ref().map(|_| VehicleSummary {
            make: row.vehicle_make,
            model: row.vehicle_model,
            year: row.vehicle_year,
            vin: row.vehicle_vin,
            engine_type: row.vehicle_engine_type,
        });

        Ok(Self {
            task: Task {
                category: parse_category(row.category)?,
                status: row.status.parse::<TaskStatus>().context("stored task status")?,
                id: row.id,
                vehicle_id: row.vehicle_id,
                customer_id: row.customer_id,
                title: row.title,
                description: row.description,
                created_date: row.created_date,
                due_date: row.due_date,
            },
            customer_name: row.customer_name,
            vehicle,
        })
    }
}

// ===== Invoices =====

impl From<invoice_line_item::Model> for InvoiceLineItem {
    fn from(entity: invoice_line_item::Model) -> Self {
        Self {
            id: entity.id,
            invoice_id: entity.invoice_id,
            description: entity.description,
            quantity: entity.quantity,
            unit_price: entity.unit_price,
            total_price: entity.total_price,
        }
    }
}

/// Header columns of an invoice as they should be stored
impl From<&Invoice> for invoice::Model {
    fn from(model: &Invoice) -> Self {
        Self {
            id: model.id.clone(),
            customer_id: model.customer_id.clone(),
            task_id: model.task_id.clone(),
            invoice_number: model.invoice_number.clone(),
            issue_date: model.issue_date,
            due_date: model.due_date,
            total_amount: model.total_amount,
            payment_status: model.payment_status.as_str().to_string(),
            notes: model.notes.clone(),
        }
    }
}

/// Line items of an invoice as active models, positioned in supplied order
pub fn line_item_models(model: &Invoice) -> Vec<invoice_line_item::ActiveModel> {
    model
        .line_items
        .iter()
        .enumerate()
        .map(|(position, item)| invoice_line_item::ActiveModel {
            id: Set(item.id.clone()),
            invoice_id: Set(model.id.clone()),
            description: Set(item.description.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            total_price: Set(item.total_price),
            position: Set(position as i32),
        })
        .collect()
}

/// Whether the stored items already hold the same content as `invoice`
pub fn same_line_items(stored: &[invoice_line_item::Model], invoice: &Invoice) -> bool {
    stored.len() == invoice.line_items.len()
        && stored.iter().zip(&invoice.line_items).all(|(old, new)| {
            old.description == new.description
                && old.quantity == new.quantity
                && old.unit_price == new.unit_price
                && old.total_price == new.total_price
        })
}

/// Assemble an invoice from its joined header row and its ordered items.
///
/// The total is derived from the items rather than trusted from the header.
pub fn invoice_details(
    row: InvoiceRow,
    items: Vec<invoice_line_item::Model>,
) -> anyhow::Result<InvoiceDetails> {
    let line_items: Vec<InvoiceLineItem> = items.into_iter().map(Into::into).collect();
    let total_amount = line_items.iter().map(|item| item.total_price).sum();

    if total_amount != row.total_amount {
        tracing::warn!(
            invoice_id = %row.id,
            stored = %row.total_amount,
            derived = %total_amount,
            "Stored invoice total differs from its line items"
        );
    }

    Ok(InvoiceDetails {
        invoice: Invoice {
            payment_status: row
                .payment_status
                .parse::<PaymentStatus>()
                .context("stored payment status")?,
            id: row.id,
            customer_id: row.customer_id,
            task_id: row.task_id,
            invoice_number: row.invoice_number,
            issue_date: row.issue_date,
            due_date: row.due_date,
            total_amount,
            notes: row.notes,
            line_items,
        },
        customer_name: row.customer_name,
        task_title: row.task_title,
    })
}

// ===== Schedule =====

impl From<schedule_entry::Model> for ScheduleEntry {
    fn from(entity: schedule_entry::Model) -> Self {
        Self {
            id: entity.id,
            task_id: entity.task_id,
            job_date: entity.job_date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            notes: entity.notes,
        }
    }
}

impl From<&ScheduleEntry> for schedule_entry::ActiveModel {
    fn from(model: &ScheduleEntry) -> Self {
        Self {
            id: Set(model.id.clone()),
            task_id: Set(model.task_id.clone()),
            job_date: Set(model.job_date),
            start_time: Set(model.start_time),
            end_time: Set(model.end_time),
            notes: Set(model.notes.clone()),
        }
    }
}

// ===== Photos =====

impl TryFrom<photo::Model> for Photo {
    type Error = anyhow::Error;

    fn try_from(entity: photo::Model) -> Result<Self, Self::Error> {
        let kind = entity
            .parent_type
            .parse::<PhotoParentKind>()
            .context("stored photo parent type")?;

        Ok(Self {
            id: entity.id,
            parent: PhotoParent::new(kind, entity.parent_id),
            uri: entity.uri,
            notes: entity.notes,
        })
    }
}

impl From<&Photo> for photo::ActiveModel {
    fn from(model: &Photo) -> Self {
        Self {
            id: Set(model.id.clone()),
            parent_id: Set(model.parent.id().to_string()),
            parent_type: Set(model.parent.kind().as_str().to_string()),
            uri: Set(model.uri.clone()),
            notes: Set(model.notes.clone()),
        }
    }
}
