//! Shop Service Module
//!
//! Local record keeping for an auto repair shop: customers, their vehicles,
//! work tasks, invoices with line items, schedule entries and photos.
//! Deleting a record removes everything it owns in one transaction.

// Public exports
pub mod contract;
pub use contract::{
    client::ShopApi, error::ShopError, Customer, CustomerDraft, CustomerFilter, Invoice,
    InvoiceDetails, InvoiceDraft, InvoiceFilter, InvoiceLineItem, LineItemDraft, PaymentStatus,
    Photo, PhotoDraft, PhotoParent, PhotoParentKind, ScheduleEntry, ScheduleEntryDraft, Task,
    TaskCategory, TaskDetails, TaskDraft, TaskFilter, TaskStatus, Vehicle, VehicleDraft,
    VehicleFilter, VehicleListing, VehicleSummary,
};

pub mod config;
pub use config::{Config, TaskDeletePolicy};

pub mod module;
pub use module::{init_schema, ShopServiceModule};

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
