//! Common test utilities: an isolated shop over a temporary SQLite file

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, Statement};
use shop_service::infra::storage::entity::invoice;
use shop_service::{
    Config, CustomerDraft, InvoiceDraft, LineItemDraft, PaymentStatus, ShopApi,
    ShopServiceModule, TaskDeletePolicy, TaskDraft, TaskStatus, VehicleDraft,
};
use std::sync::{Arc, Once};
use tempfile::TempDir;

pub const TABLES: [&str; 7] = [
    "customers",
    "vehicles",
    "tasks",
    "invoices",
    "invoice_line_items",
    "schedule_entries",
    "photos",
];

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// SQLite URL for a file inside `dir`
pub fn sqlite_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("shop.db").display())
}

/// A fully initialized shop; the database file lives as long as this value
pub struct TestShop {
    pub dir: TempDir,
    pub module: ShopServiceModule,
    pub client: Arc<dyn ShopApi>,
    pub db: Arc<DatabaseConnection>,
}

impl TestShop {
    pub async fn new() -> Self {
        Self::with_policy(TaskDeletePolicy::StripLineItems).await
    }

    pub async fn with_policy(task_delete_policy: TaskDeletePolicy) -> Self {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let module = ShopServiceModule::default();
        module
            .init(Config {
                database_url: sqlite_url(&dir),
                task_delete_policy,
                ..Default::default()
            })
            .await
            .unwrap();

        let client = module.client().unwrap();
        let db = module.connection().unwrap();
        Self {
            dir,
            module,
            client,
            db,
        }
    }

    pub async fn count(&self, table: &str) -> i64 {
        count_rows(&self.db, table, None).await
    }

    /// Rows of `table` whose `column` equals `value`
    pub async fn count_where(&self, table: &str, column: &str, value: &str) -> i64 {
        count_rows(&self.db, table, Some((column, value))).await
    }

    /// Row counts of every table, in a fixed order
    pub async fn snapshot(&self) -> Vec<(&'static str, i64)> {
        let mut counts = Vec::new();
        for table in TABLES {
            counts.push((table, self.count(table).await));
        }
        counts
    }

    /// `total_amount` as stored on the invoice row, not derived from items
    pub async fn stored_invoice_total(&self, id: &str) -> Decimal {
        invoice::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .unwrap()
            .unwrap()
            .total_amount
    }

    /// Make every DELETE on `table` fail
    pub async fn fail_deletes_on(&self, table: &str) {
        self.db
            .execute_unprepared(&format!(
                "CREATE TRIGGER fail_delete_{table} BEFORE DELETE ON {table} \
                 BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
            ))
            .await
            .unwrap();
    }

    /// Make inserting a line item described as `description` fail
    pub async fn fail_line_item_insert(&self, description: &str) {
        self.db
            .execute_unprepared(&format!(
                "CREATE TRIGGER fail_line_item BEFORE INSERT ON invoice_line_items \
                 WHEN NEW.description = '{description}' \
                 BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
            ))
            .await
            .unwrap();
    }
}

pub async fn count_rows(
    db: &DatabaseConnection,
    table: &str,
    filter: Option<(&str, &str)>,
) -> i64 {
    let stmt = match filter {
        Some((column, value)) => Statement::from_sql_and_values(
            DbBackend::Sqlite,
            format!("SELECT COUNT(*) AS n FROM {table} WHERE {column} = ?"),
            [value.into()],
        ),
        None => Statement::from_string(
            DbBackend::Sqlite,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ),
    };
    let row = db.query_one(stmt).await.unwrap().unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

// ===== Builders =====

pub fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn customer(name: &str) -> CustomerDraft {
    CustomerDraft {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn vehicle(customer_id: &str, make: &str, model: &str, vin: Option<&str>) -> VehicleDraft {
    VehicleDraft {
        customer_id: customer_id.to_string(),
        make: Some(make.to_string()),
        model: Some(model.to_string()),
        year: Some(2020),
        vin: vin.map(str::to_string),
        ..Default::default()
    }
}

pub fn task(customer_id: &str, vehicle_id: Option<&str>, title: &str) -> TaskDraft {
    TaskDraft {
        customer_id: Some(customer_id.to_string()),
        vehicle_id: vehicle_id.map(str::to_string),
        title: title.to_string(),
        status: TaskStatus::ToDo,
        ..Default::default()
    }
}

pub fn item(description: &str, quantity: i64, unit_cents: i64) -> LineItemDraft {
    LineItemDraft::new(description, Decimal::from(quantity), money(unit_cents))
}

pub fn invoice(customer_id: &str, task_id: Option<&str>, items: Vec<LineItemDraft>) -> InvoiceDraft {
    InvoiceDraft {
        id: None,
        customer_id: customer_id.to_string(),
        task_id: task_id.map(str::to_string),
        invoice_number: None,
        issue_date: date(2025, 6, 1),
        due_date: None,
        payment_status: PaymentStatus::Pending,
        notes: None,
        line_items: items,
    }
}

/// One customer owning a vehicle, a task on it, an invoice for the task and
/// a photo of each
pub struct Fleet {
    pub customer_id: String,
    pub vehicle_id: String,
    pub task_id: String,
    pub invoice_id: String,
}

pub async fn seed_fleet(client: &Arc<dyn ShopApi>, name: &str, vin: &str) -> Fleet {
    use shop_service::{PhotoDraft, PhotoParent, ScheduleEntryDraft};

    let customer_id = client.add_customer(customer(name)).await.unwrap();
    let vehicle_id = client
        .add_vehicle(vehicle(&customer_id, "Toyota", "Camry", Some(vin)))
        .await
        .unwrap();
    let task_id = client
        .add_task(task(&customer_id, Some(&vehicle_id), "Brake job"))
        .await
        .unwrap();
    let invoice_id = client
        .add_invoice(invoice(
            &customer_id,
            Some(&task_id),
            vec![item("Pads", 2, 4500), item("Labor", 1, 8000)],
        ))
        .await
        .unwrap();

    client
        .add_schedule_entry(ScheduleEntryDraft {
            task_id: Some(task_id.clone()),
            job_date: Some(date(2025, 6, 2)),
            ..Default::default()
        })
        .await
        .unwrap();

    for parent in [
        PhotoParent::Customer(customer_id.clone()),
        PhotoParent::Vehicle(vehicle_id.clone()),
        PhotoParent::Task(task_id.clone()),
    ] {
        client
            .add_photo(PhotoDraft {
                id: None,
                parent,
                uri: format!("file:///photos/{}.jpg", uuid::Uuid::new_v4()),
                notes: None,
            })
            .await
            .unwrap();
    }

    Fleet {
        customer_id,
        vehicle_id,
        task_id,
        invoice_id,
    }
}
