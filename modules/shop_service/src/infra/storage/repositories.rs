//! SeaORM repository implementations
//!
//! Multi-statement writes (invoice with items, updates, cascades) each run in
//! one transaction and every query inside uses that transaction, so a pool of
//! one connection never waits on itself.

use crate::contract::{
    Customer, CustomerFilter, Invoice, InvoiceDetails, InvoiceFilter, Photo, PhotoParent,
    ScheduleEntry, Task, TaskDetails, TaskFilter, Vehicle, VehicleFilter, VehicleListing,
};
use crate::domain::repository::{
    CustomerRepository, InvoiceRepository, PhotoRepository, ScheduleRepository, TaskRepository,
    VehicleRepository,
};
use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, JoinType, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::cascade::{self, Node};
use super::entity::{
    customer, invoice, invoice_line_item, photo, schedule_entry, task, vehicle,
};
use super::mapper::{self, InvoiceRow, TaskRow, VehicleRow};

fn ensure_inserted(rows: u64, expected: u64, what: &str) -> Result<()> {
    ensure!(
        rows == expected,
        "{} insert affected {} rows, expected {}",
        what,
        rows,
        expected
    );
    Ok(())
}

/// Case-insensitive substring match
fn contains_ci(column: impl IntoColumnRef, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", needle.to_lowercase()))
}

/// Run a cascade from `root` in its own transaction
async fn delete_cascade(db: &DatabaseConnection, root: Node, id: &str) -> Result<u64> {
    let txn = db.begin().await?;
    let rows = cascade::delete(&txn, root, id)
        .await
        .with_context(|| format!("cascade delete of {} {}", root.table(), id))?;
    txn.commit().await?;

    tracing::debug!(table = root.table(), id, rows, "Deleted with dependents");
    Ok(rows)
}

// ===== Customer Repository =====

pub struct SeaOrmCustomerRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    async fn create(&self, customer: &Customer) -> Result<()> {
        let active = customer::Model::from(customer).into_active_model().reset_all();
        let rows = customer::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        ensure_inserted(rows, 1, "customer")?;

        tracing::debug!(customer_id = %customer.id, "Customer inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>> {
        let result = customer::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>> {
        let mut query = customer::Entity::find();

        if let Some(name) = &filter.name {
            query = query.filter(contains_ci(customer::Column::Name, name));
        }

        let results = query
            .order_by_asc(customer::Column::Name)
            .order_by_asc(customer::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update(&self, customer: &Customer) -> Result<u64> {
        let txn = self.db.begin().await?;

        let Some(stored) = customer::Entity::find_by_id(customer.id.as_str())
            .one(&txn)
            .await?
        else {
            return Ok(0);
        };

        let updated = customer::Model::from(customer);
        if updated == stored {
            tracing::debug!(customer_id = %customer.id, "Customer unchanged");
            return Ok(0);
        }

        let mut active = updated.into_active_model().reset_all();
        active.id = NotSet;
        let result = customer::Entity::update_many()
            .set(active)
            .filter(customer::Column::Id.eq(customer.id.as_str()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::debug!(customer_id = %customer.id, rows = result.rows_affected, "Customer updated");
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: &str) -> Result<u64> {
        delete_cascade(&self.db, Node::Customer, id).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let count = customer::Entity::find_by_id(id).count(&*self.db).await?;
        Ok(count > 0)
    }
}

// ===== Vehicle Repository =====

pub struct SeaOrmVehicleRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmVehicleRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VehicleRepository for SeaOrmVehicleRepository {
    async fn create(&self, vehicle: &Vehicle) -> Result<()> {
        let active = vehicle::Model::from(vehicle).into_active_model().reset_all();
        let rows = vehicle::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        ensure_inserted(rows, 1, "vehicle")?;

        tracing::debug!(vehicle_id = %vehicle.id, customer_id = %vehicle.customer_id, "Vehicle inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Vehicle>> {
        let result = vehicle::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self, filter: &VehicleFilter) -> Result<Vec<VehicleListing>> {
        let mut query = vehicle::Entity::find()
            .column_as(customer::Column::Name, "customer_name")
            .join(JoinType::InnerJoin, vehicle::Relation::Customer.def());

        if let Some(customer_id) = &filter.customer_id {
            query = query.filter(vehicle::Column::CustomerId.eq(customer_id.as_str()));
        }
        if let Some(make) = &filter.make {
            query = query.filter(contains_ci((vehicle::Entity, vehicle::Column::Make), make));
        }
        if let Some(model) = &filter.model {
            query = query.filter(contains_ci((vehicle::Entity, vehicle::Column::Model), model));
        }

        let rows = query
            .order_by_asc(vehicle::Column::Make)
            .order_by_asc(vehicle::Column::Model)
            .order_by_asc(vehicle::Column::Id)
            .into_model::<VehicleRow>()
            .all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, vehicle: &Vehicle) -> Result<u64> {
        let txn = self.db.begin().await?;

        let Some(stored) = vehicle::Entity::find_by_id(vehicle.id.as_str())
            .one(&txn)
            .await?
        else {
            return Ok(0);
        };

        let updated = vehicle::Model::from(vehicle);
        if updated == stored {
            tracing::debug!(vehicle_id = %vehicle.id, "Vehicle unchanged");
            return Ok(0);
        }

        let mut active = updated.into_active_model().reset_all();
        active.id = NotSet;
        let result = vehicle::Entity::update_many()
            .set(active)
            .filter(vehicle::Column::Id.eq(vehicle.id.as_str()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::debug!(vehicle_id = %vehicle.id, rows = result.rows_affected, "Vehicle updated");
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: &str) -> Result<u64> {
        delete_cascade(&self.db, Node::Vehicle, id).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let count = vehicle::Entity::find_by_id(id).count(&*self.db).await?;
        Ok(count > 0)
    }
}

// ===== Task Repository =====

pub struct SeaOrmTaskRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTaskRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Tasks left-joined with their customer and vehicle
    fn details_query() -> Select<task::Entity> {
        task::Entity::find()
            .column_as(customer::Column::Name, "customer_name")
            .column_as(vehicle::Column::Make, "vehicle_make")
            .column_as(vehicle::Column::Model, "vehicle_model")
            .column_as(vehicle::Column::Year, "vehicle_year")
            .column_as(vehicle::Column::Vin, "vehicle_vin")
            .column_as(vehicle::Column::EngineType, "vehicle_engine_type")
            .join(JoinType::LeftJoin, task::Relation::Customer.def())
            .join(JoinType::LeftJoin, task::Relation::Vehicle.def())
    }
}

#[async_trait]
impl TaskRepository for SeaOrmTaskRepository {
    async fn create(&self, task: &Task) -> Result<()> {
        let active = task::Model::from(task).into_active_model().reset_all();
        let rows = task::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        ensure_inserted(rows, 1, "task")?;

        tracing::debug!(task_id = %task.id, "Task inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TaskDetails>> {
        let row = Self::details_query()
            .filter(task::Column::Id.eq(id))
            .into_model::<TaskRow>()
            .one(&*self.db)
            .await?;

        row.map(TaskDetails::try_from).transpose()
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskDetails>> {
        let mut query = Self::details_query();

        if let Some(customer_id) = &filter.customer_id {
            query = query.filter(task::Column::CustomerId.eq(customer_id.as_str()));
        }
        if let Some(vehicle_id) = &filter.vehicle_id {
            query = query.filter(task::Column::VehicleId.eq(vehicle_id.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(task::Column::Status.eq(status.as_str()));
        }
        if let Some(category) = filter.category {
            query = query.filter(task::Column::Category.eq(category.as_str()));
        }

        let rows = query
            .order_by_desc(task::Column::CreatedDate)
            .order_by_desc(task::Column::Id)
            .into_model::<TaskRow>()
            .all(&*self.db)
            .await?;

        rows.into_iter().map(TaskDetails::try_from).collect()
    }

    async fn update(&self, task: &Task) -> Result<u64> {
        let txn = self.db.begin().await?;

        let Some(stored) = task::Entity::find_by_id(task.id.as_str()).one(&txn).await? else {
            return Ok(0);
        };

        let mut updated = task::Model::from(task);
        updated.created_date = stored.created_date;
        if updated == stored {
            tracing::debug!(task_id = %task.id, "Task unchanged");
            return Ok(0);
        }

        let mut active = updated.into_active_model().reset_all();
        active.id = NotSet;
        active.created_date = NotSet;
        let result = task::Entity::update_many()
            .set(active)
            .filter(task::Column::Id.eq(task.id.as_str()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::debug!(task_id = %task.id, rows = result.rows_affected, "Task updated");
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: &str) -> Result<u64> {
        delete_cascade(&self.db, Node::Task, id).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let count = task::Entity::find_by_id(id).count(&*self.db).await?;
        Ok(count > 0)
    }
}

// ===== Invoice Repository =====

pub struct SeaOrmInvoiceRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmInvoiceRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Invoices joined with customer name and left-joined with task title
    fn details_query() -> Select<invoice::Entity> {
        invoice::Entity::find()
            .column_as(customer::Column::Name, "customer_name")
            .column_as(task::Column::Title, "task_title")
            .join(JoinType::InnerJoin, invoice::Relation::Customer.def())
            .join(JoinType::LeftJoin, invoice::Relation::Task.def())
    }

    async fn insert_line_items<C: ConnectionTrait>(conn: &C, invoice: &Invoice) -> Result<()> {
        let items = mapper::line_item_models(invoice);
        if items.is_empty() {
            return Ok(());
        }

        let expected = items.len() as u64;
        let rows = invoice_line_item::Entity::insert_many(items)
            .exec_without_returning(conn)
            .await?;
        ensure_inserted(rows, expected, "invoice line item")
    }

    /// Attach ordered line items to header rows
    async fn with_line_items<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<InvoiceRow>,
    ) -> Result<Vec<InvoiceDetails>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let items = invoice_line_item::Entity::find()
            .filter(invoice_line_item::Column::InvoiceId.is_in(ids))
            .order_by_asc(invoice_line_item::Column::InvoiceId)
            .order_by_asc(invoice_line_item::Column::Position)
            .all(conn)
            .await?;

        let mut by_invoice: HashMap<String, Vec<invoice_line_item::Model>> = HashMap::new();
        for item in items {
            by_invoice.entry(item.invoice_id.clone()).or_default().push(item);
        }

        rows.into_iter()
            .map(|row| {
                let items = by_invoice.remove(&row.id).unwrap_or_default();
                mapper::invoice_details(row, items)
            })
            .collect()
    }
}

#[async_trait]
impl InvoiceRepository for SeaOrmInvoiceRepository {
    async fn create(&self, invoice: &Invoice) -> Result<()> {
        let txn = self.db.begin().await?;

        let header = invoice::Model::from(invoice).into_active_model().reset_all();
        let rows = invoice::Entity::insert(header)
            .exec_without_returning(&txn)
            .await?;
        ensure_inserted(rows, 1, "invoice")?;
        Self::insert_line_items(&txn, invoice)
            .await
            .with_context(|| format!("line items of invoice {}", invoice.id))?;

        txn.commit().await?;

        tracing::debug!(
            invoice_id = %invoice.id,
            items = invoice.line_items.len(),
            total = %invoice.total_amount,
            "Invoice inserted"
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<InvoiceDetails>> {
        let rows = Self::details_query()
            .filter(invoice::Column::Id.eq(id))
            .into_model::<InvoiceRow>()
            .all(&*self.db)
            .await?;

        Ok(Self::with_line_items(&*self.db, rows).await?.pop())
    }

    async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<InvoiceDetails>> {
        let mut query = Self::details_query();

        if let Some(customer_id) = &filter.customer_id {
            query = query.filter(invoice::Column::CustomerId.eq(customer_id.as_str()));
        }
        if let Some(task_id) = &filter.task_id {
            query = query.filter(invoice::Column::TaskId.eq(task_id.as_str()));
        }
        if let Some(status) = filter.payment_status {
            query = query.filter(invoice::Column::PaymentStatus.eq(status.as_str()));
        }

        let rows = query
            .order_by_desc(invoice::Column::IssueDate)
            .order_by_desc(invoice::Column::InvoiceNumber)
            .order_by_desc(invoice::Column::Id)
            .into_model::<InvoiceRow>()
            .all(&*self.db)
            .await?;

        Self::with_line_items(&*self.db, rows).await
    }

    async fn update(&self, invoice: &Invoice) -> Result<u64> {
        let txn = self.db.begin().await?;

        let Some(stored) = invoice::Entity::find_by_id(invoice.id.as_str())
            .one(&txn)
            .await?
        else {
            return Ok(0);
        };

        let stored_items = invoice_line_item::Entity::find()
            .filter(invoice_line_item::Column::InvoiceId.eq(invoice.id.as_str()))
            .order_by_asc(invoice_line_item::Column::Position)
            .all(&txn)
            .await?;

        let mut rows: u64 = 0;
        let header = invoice::Model::from(invoice);
        if header != stored {
            let mut active = header.into_active_model().reset_all();
            active.id = NotSet;
            rows = invoice::Entity::update_many()
                .set(active)
                .filter(invoice::Column::Id.eq(invoice.id.as_str()))
                .exec(&txn)
                .await?
                .rows_affected;
        }

        let replace_items = !mapper::same_line_items(&stored_items, invoice);
        if replace_items {
            invoice_line_item::Entity::delete_many()
                .filter(invoice_line_item::Column::InvoiceId.eq(invoice.id.as_str()))
                .exec(&txn)
                .await?;
            Self::insert_line_items(&txn, invoice)
                .await
                .with_context(|| format!("line items of invoice {}", invoice.id))?;
            // An item-only edit still changed the invoice
            rows = rows.max(1);
        }

        txn.commit().await?;

        tracing::debug!(
            invoice_id = %invoice.id,
            rows,
            replace_items,
            "Invoice updated"
        );
        Ok(rows)
    }

    async fn delete(&self, id: &str) -> Result<u64> {
        delete_cascade(&self.db, Node::Invoice, id).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let count = invoice::Entity::find_by_id(id).count(&*self.db).await?;
        Ok(count > 0)
    }
}

// ===== Photo Repository =====

pub struct SeaOrmPhotoRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPhotoRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PhotoRepository for SeaOrmPhotoRepository {
    async fn create(&self, photo: &Photo) -> Result<()> {
        let rows = photo::Entity::insert(photo::ActiveModel::from(photo))
            .exec_without_returning(&*self.db)
            .await?;
        ensure_inserted(rows, 1, "photo")?;

        tracing::debug!(photo_id = %photo.id, parent = ?photo.parent, "Photo inserted");
        Ok(())
    }

    async fn list_for_parent(&self, parent: &PhotoParent) -> Result<Vec<Photo>> {
        let results = photo::Entity::find()
            .filter(photo::Column::ParentType.eq(parent.kind().as_str()))
            .filter(photo::Column::ParentId.eq(parent.id()))
            .order_by(Expr::cust("rowid"), Order::Asc)
            .all(&*self.db)
            .await?;

        results.into_iter().map(Photo::try_from).collect()
    }

    async fn update_notes(&self, id: &str, notes: Option<String>) -> Result<u64> {
        let txn = self.db.begin().await?;

        let Some(stored) = photo::Entity::find_by_id(id).one(&txn).await? else {
            return Ok(0);
        };
        if stored.notes == notes {
            return Ok(0);
        }

        let result = photo::Entity::update_many()
            .col_expr(photo::Column::Notes, Expr::value(notes))
            .filter(photo::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::debug!(photo_id = id, rows = result.rows_affected, "Photo notes updated");
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: &str) -> Result<u64> {
        delete_cascade(&self.db, Node::Photo, id).await
    }
}

// ===== Schedule Repository =====

pub struct SeaOrmScheduleRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmScheduleRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScheduleRepository for SeaOrmScheduleRepository {
    async fn create(&self, entry: &ScheduleEntry) -> Result<()> {
        let rows = schedule_entry::Entity::insert(schedule_entry::ActiveModel::from(entry))
            .exec_without_returning(&*self.db)
            .await?;
        ensure_inserted(rows, 1, "schedule entry")?;

        tracing::debug!(entry_id = %entry.id, task_id = ?entry.task_id, "Schedule entry inserted");
        Ok(())
    }

    async fn list_for_task(&self, task_id: &str) -> Result<Vec<ScheduleEntry>> {
        let results = schedule_entry::Entity::find()
            .filter(schedule_entry::Column::TaskId.eq(task_id))
            .order_by_asc(schedule_entry::Column::JobDate)
            .order_by_asc(schedule_entry::Column::StartTime)
            .order_by_asc(schedule_entry::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }
}
