//! Domain layer - business logic and services

pub mod pricing;
pub mod repository;
pub mod service;
pub mod validation;

pub use repository::{
    CustomerRepository, InvoiceRepository, PhotoRepository, ScheduleRepository, TaskRepository,
    VehicleRepository,
};
pub use service::{Repositories, Service};
