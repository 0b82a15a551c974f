//! Contract layer - public API for in-process callers
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod model;

pub use client::ShopApi;
pub use error::ShopError;
pub use model::{
    Customer, CustomerDraft, CustomerFilter, Invoice, InvoiceDetails, InvoiceDraft,
    InvoiceFilter, InvoiceLineItem, LineItemDraft, PaymentStatus, Photo, PhotoDraft,
    PhotoParent, PhotoParentKind, ScheduleEntry, ScheduleEntryDraft, Task, TaskCategory,
    TaskDetails, TaskDraft, TaskFilter, TaskStatus, Vehicle, VehicleDraft, VehicleFilter,
    VehicleListing, VehicleSummary,
};
