//! Module declaration and lifecycle implementation

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::{ShopApi, ShopError};
use crate::domain::{Repositories, Service};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::repositories::{
    SeaOrmCustomerRepository, SeaOrmInvoiceRepository, SeaOrmPhotoRepository,
    SeaOrmScheduleRepository, SeaOrmTaskRepository, SeaOrmVehicleRepository,
};
use anyhow::{bail, Result};
use parking_lot::RwLock;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Create missing tables and columns. Safe to call on every start.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), ShopError> {
    Migrator::up(db, None).await.map_err(|err| {
        tracing::error!(error = %err, "Schema initialization failed");
        ShopError::Persistence {
            cause: err.to_string(),
        }
    })?;

    tracing::info!("Shop schema ready");
    Ok(())
}

/// Shop service module
///
/// Owns the one store connection of the process and the service built on it.
pub struct ShopServiceModule {
    config: RwLock<Config>,
    db: RwLock<Option<Arc<DatabaseConnection>>>,
    service: RwLock<Option<Arc<Service>>>,
    /// Held for the whole of `init`, so concurrent callers open one store
    init_lock: Mutex<()>,
}

impl Default for ShopServiceModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            db: RwLock::new(None),
            service: RwLock::new(None),
            init_lock: Mutex::new(()),
        }
    }
}

impl ShopServiceModule {
    /// Connect, bring the schema up to date and wire the service
    pub async fn init(&self, cfg: Config) -> Result<()> {
        let _init = self.init_lock.lock().await;
        if self.service.read().is_some() {
            bail!("Shop service already initialized");
        }

        let mut opts = ConnectOptions::new(cfg.database_url.clone());
        opts.max_connections(cfg.max_connections)
            .sqlx_logging(cfg.sqlx_logging);
        let db = Database::connect(opts).await?;

        init_schema(&db).await?;

        let conn = Arc::new(db);
        let repos = Repositories {
            customers: Arc::new(SeaOrmCustomerRepository::new(conn.clone())),
            vehicles: Arc::new(SeaOrmVehicleRepository::new(conn.clone())),
            tasks: Arc::new(SeaOrmTaskRepository::new(conn.clone())),
            invoices: Arc::new(SeaOrmInvoiceRepository::new(conn.clone())),
            photos: Arc::new(SeaOrmPhotoRepository::new(conn.clone())),
            schedule: Arc::new(SeaOrmScheduleRepository::new(conn.clone())),
        };
        let service = Arc::new(Service::new(repos, cfg.task_delete_policy));

        tracing::info!(
            max_connections = cfg.max_connections,
            task_delete_policy = ?cfg.task_delete_policy,
            "Shop service initialized"
        );

        *self.db.write() = Some(conn);
        *self.service.write() = Some(service);
        *self.config.write() = cfg;
        Ok(())
    }

    /// In-process client over the initialized service
    pub fn client(&self) -> Result<Arc<dyn ShopApi>> {
        let service = self
            .service
            .read()
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?
            .clone();

        Ok(Arc::new(NativeClient::new(service)))
    }

    /// Shared store handle, once initialized
    pub fn connection(&self) -> Option<Arc<DatabaseConnection>> {
        self.db.read().clone()
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }
}
