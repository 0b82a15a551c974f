//! Input validation and normalization
//!
//! Drafts are turned into records here before any write. Blank optional
//! strings become `None`, so an empty VIN never collides with the unique key.

use crate::contract::{
    Customer, CustomerDraft, Invoice, InvoiceDraft, LineItemDraft, Photo, PhotoDraft,
    ScheduleEntry, ScheduleEntryDraft, ShopError, Task, TaskDraft, Vehicle, VehicleDraft,
};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::pricing;

/// First year a production automobile existed
pub const MIN_VEHICLE_YEAR: i32 = 1886;

/// Use the caller's id or generate a v4 UUID
pub fn record_id(id: Option<String>) -> Result<String, ShopError> {
    match id {
        None => Ok(Uuid::new_v4().to_string()),
        Some(id) if id.trim().is_empty() => Err(ShopError::validation("id cannot be blank")),
        Some(id) => Ok(id),
    }
}

/// Collapse blank strings to `None`
pub fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(field: &str, value: String) -> Result<String, ShopError> {
    if value.trim().is_empty() {
        return Err(ShopError::validation(format!("{} is required", field)));
    }
    Ok(value)
}

/// Accepts `local@domain` with no whitespace
pub fn validate_email(email: &str) -> Result<(), ShopError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ShopError::validation(format!("invalid email '{}'", email)));
    }
    Ok(())
}

pub fn validate_year(year: i32) -> Result<(), ShopError> {
    let max = Utc::now().year() + 1;
    if !(MIN_VEHICLE_YEAR..=max).contains(&year) {
        return Err(ShopError::validation(format!(
            "vehicle year {} outside {}..={}",
            year, MIN_VEHICLE_YEAR, max
        )));
    }
    Ok(())
}

fn validate_line_item(index: usize, item: &LineItemDraft) -> Result<(), ShopError> {
    if item.description.trim().is_empty() {
        return Err(ShopError::validation(format!(
            "line item {} needs a description",
            index + 1
        )));
    }
    if item.quantity <= Decimal::ZERO {
        return Err(ShopError::validation(format!(
            "line item {} quantity must be positive",
            index + 1
        )));
    }
    if item.unit_price < Decimal::ZERO {
        return Err(ShopError::validation(format!(
            "line item {} unit price cannot be negative",
            index + 1
        )));
    }
    Ok(())
}

pub fn customer(id: String, draft: CustomerDraft) -> Result<Customer, ShopError> {
    let email = optional(draft.email);
    if let Some(email) = &email {
        validate_email(email)?;
    }

    Ok(Customer {
        id,
        name: required("customer name", draft.name)?,
        phone: optional(draft.phone),
        email,
        address: optional(draft.address),
    })
}

pub fn vehicle(id: String, draft: VehicleDraft) -> Result<Vehicle, ShopError> {
    if let Some(year) = draft.year {
        validate_year(year)?;
    }

    Ok(Vehicle {
        id,
        customer_id: required("vehicle customer", draft.customer_id)?,
        make: optional(draft.make),
        model: optional(draft.model),
        year: draft.year,
        vin: optional(draft.vin),
        engine_type: optional(draft.engine_type),
    })
}

pub fn task(id: String, draft: TaskDraft, created_date: DateTime<Utc>) -> Result<Task, ShopError> {
    Ok(Task {
        id,
        vehicle_id: optional(draft.vehicle_id),
        customer_id: optional(draft.customer_id),
        title: required("task title", draft.title)?,
        description: optional(draft.description),
        category: draft.category,
        status: draft.status,
        created_date,
        due_date: draft.due_date,
    })
}

/// Validate and price an invoice
pub fn invoice(id: String, draft: InvoiceDraft) -> Result<Invoice, ShopError> {
    let customer_id = required("invoice customer", draft.customer_id)?;
    if draft.line_items.is_empty() {
        return Err(ShopError::validation("invoice needs at least one line item"));
    }
    for (index, item) in draft.line_items.iter().enumerate() {
        validate_line_item(index, item)?;
    }

    let line_items = pricing::price_line_items(&id, draft.line_items)?;
    let total_amount = pricing::invoice_total(&line_items)?;

    Ok(Invoice {
        id,
        customer_id,
        task_id: optional(draft.task_id),
        invoice_number: optional(draft.invoice_number),
        issue_date: draft.issue_date,
        due_date: draft.due_date,
        total_amount,
        payment_status: draft.payment_status,
        notes: optional(draft.notes),
        line_items,
    })
}

pub fn schedule_entry(id: String, draft: ScheduleEntryDraft) -> ScheduleEntry {
    ScheduleEntry {
        id,
        task_id: optional(draft.task_id),
        job_date: draft.job_date,
        start_time: draft.start_time,
        end_time: draft.end_time,
        notes: optional(draft.notes),
    }
}

pub fn photo(id: String, draft: PhotoDraft) -> Result<Photo, ShopError> {
    if draft.parent.id().trim().is_empty() {
        return Err(ShopError::validation("photo parent id is required"));
    }

    Ok(Photo {
        id,
        parent: draft.parent,
        uri: required("photo uri", draft.uri)?,
        notes: optional(draft.notes),
    })
}
