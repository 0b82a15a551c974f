//! Database migrations for the shop service
//!
//! Both migrations are safe to run against a store created by an earlier
//! build of the app: tables and indexes use IF NOT EXISTS, and columns
//! introduced later are added with a tolerated failure when already present.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_shop_tables::Migration),
            Box::new(m20250715_000002_add_invoice_details::Migration),
        ]
    }
}

mod m20250601_000001_create_shop_tables {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000001_create_shop_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).string().not_null().primary_key())
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string())
                        .col(ColumnDef::new(Customers::Email).string())
                        .col(ColumnDef::new(Customers::Address).string())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vehicles::Id).string().not_null().primary_key())
                        .col(ColumnDef::new(Vehicles::CustomerId).string().not_null())
                        .col(ColumnDef::new(Vehicles::Make).string())
                        .col(ColumnDef::new(Vehicles::Model).string())
                        .col(ColumnDef::new(Vehicles::Year).integer())
                        .col(ColumnDef::new(Vehicles::Vin).string().unique_key())
                        .col(ColumnDef::new(Vehicles::EngineType).string())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_vehicles_customer")
                                .from(Vehicles::Table, Vehicles::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Tasks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Tasks::Id).string().not_null().primary_key())
                        .col(ColumnDef::new(Tasks::VehicleId).string())
                        .col(ColumnDef::new(Tasks::CustomerId).string())
                        .col(ColumnDef::new(Tasks::Title).string().not_null())
                        .col(ColumnDef::new(Tasks::Description).string())
                        .col(ColumnDef::new(Tasks::Category).string())
                        .col(ColumnDef::new(Tasks::Status).string().not_null())
                        .col(
                            ColumnDef::new(Tasks::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(ColumnDef::new(Tasks::DueDate).date())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tasks_vehicle")
                                .from(Tasks::Table, Tasks::VehicleId)
                                .to(Vehicles::Table, Vehicles::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tasks_customer")
                                .from(Tasks::Table, Tasks::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).string().not_null().primary_key())
                        .col(ColumnDef::new(Invoices::CustomerId).string().not_null())
                        .col(ColumnDef::new(Invoices::TaskId).string())
                        .col(ColumnDef::new(Invoices::IssueDate).date().not_null())
                        .col(ColumnDef::new(Invoices::DueDate).date())
                        .col(
                            ColumnDef::new(Invoices::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Invoices::PaymentStatus).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_customer")
                                .from(Invoices::Table, Invoices::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_task")
                                .from(Invoices::Table, Invoices::TaskId)
                                .to(Tasks::Table, Tasks::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InvoiceLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoiceLineItems::Id)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(InvoiceLineItems::InvoiceId).string().not_null())
                        .col(ColumnDef::new(InvoiceLineItems::Description).string().not_null())
                        .col(ColumnDef::new(InvoiceLineItems::Quantity).decimal().not_null())
                        .col(ColumnDef::new(InvoiceLineItems::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(InvoiceLineItems::TotalPrice).decimal().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_line_items_invoice")
                                .from(InvoiceLineItems::Table, InvoiceLineItems::InvoiceId)
                                .to(Invoices::Table, Invoices::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ScheduleEntries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ScheduleEntries::Id)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ScheduleEntries::TaskId).string())
                        .col(ColumnDef::new(ScheduleEntries::JobDate).date())
                        .col(ColumnDef::new(ScheduleEntries::StartTime).time())
                        .col(ColumnDef::new(ScheduleEntries::EndTime).time())
                        .col(ColumnDef::new(ScheduleEntries::Notes).string())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_schedule_entries_task")
                                .from(ScheduleEntries::Table, ScheduleEntries::TaskId)
                                .to(Tasks::Table, Tasks::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Photos::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Photos::Id).string().not_null().primary_key())
                        .col(ColumnDef::new(Photos::ParentId).string().not_null())
                        .col(ColumnDef::new(Photos::ParentType).string().not_null())
                        .col(ColumnDef::new(Photos::Uri).string().not_null())
                        .col(ColumnDef::new(Photos::Notes).string())
                        .to_owned(),
                )
                .await?;

            // Foreign key indexes
            let indexes = [
                ("idx_vehicles_customer_id", "vehicles", "customer_id"),
                ("idx_tasks_vehicle_id", "tasks", "vehicle_id"),
                ("idx_tasks_customer_id", "tasks", "customer_id"),
                ("idx_invoices_customer_id", "invoices", "customer_id"),
                ("idx_invoices_task_id", "invoices", "task_id"),
                ("idx_invoice_line_items_invoice_id", "invoice_line_items", "invoice_id"),
                ("idx_schedule_entries_task_id", "schedule_entries", "task_id"),
            ];
            for (name, table, column) in indexes {
                manager
                    .create_index(
                        Index::create()
                            .name(name)
                            .if_not_exists()
                            .table(Alias::new(table))
                            .col(Alias::new(column))
                            .to_owned(),
                    )
                    .await?;
            }

            manager
                .create_index(
                    Index::create()
                        .name("idx_photos_parent")
                        .if_not_exists()
                        .table(Photos::Table)
                        .col(Photos::ParentType)
                        .col(Photos::ParentId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Dependents first
            manager
                .drop_table(Table::drop().table(Photos::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ScheduleEntries::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InvoiceLineItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tasks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        Name,
        Phone,
        Email,
        Address,
    }

    #[derive(DeriveIden)]
    enum Vehicles {
        Table,
        Id,
        CustomerId,
        Make,
        Model,
        Year,
        Vin,
        EngineType,
    }

    #[derive(DeriveIden)]
    enum Tasks {
        Table,
        Id,
        VehicleId,
        CustomerId,
        Title,
        Description,
        Category,
        Status,
        CreatedDate,
        DueDate,
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
        CustomerId,
        TaskId,
        IssueDate,
        DueDate,
        TotalAmount,
        PaymentStatus,
    }

    #[derive(DeriveIden)]
    enum InvoiceLineItems {
        Table,
        Id,
        InvoiceId,
        Description,
        Quantity,
        UnitPrice,
        TotalPrice,
    }

    #[derive(DeriveIden)]
    enum ScheduleEntries {
        Table,
        Id,
        TaskId,
        JobDate,
        StartTime,
        EndTime,
        Notes,
    }

    #[derive(DeriveIden)]
    enum Photos {
        Table,
        Id,
        ParentId,
        ParentType,
        Uri,
        Notes,
    }
}

mod m20250715_000002_add_invoice_details {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250715_000002_add_invoice_details"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            add_column_tolerant(
                manager,
                Invoices::Table,
                ColumnDef::new(Invoices::InvoiceNumber).string().to_owned(),
            )
            .await?;
            add_column_tolerant(
                manager,
                Invoices::Table,
                ColumnDef::new(Invoices::Notes).string().to_owned(),
            )
            .await?;
            add_column_tolerant(
                manager,
                InvoiceLineItems::Table,
                ColumnDef::new(InvoiceLineItems::Position)
                    .integer()
                    .not_null()
                    .default(0)
                    .to_owned(),
            )
            .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .alter_table(
                    Table::alter()
                        .table(InvoiceLineItems::Table)
                        .drop_column(InvoiceLineItems::Position)
                        .to_owned(),
                )
                .await?;
            manager
                .alter_table(
                    Table::alter()
                        .table(Invoices::Table)
                        .drop_column(Invoices::Notes)
                        .to_owned(),
                )
                .await?;
            manager
                .alter_table(
                    Table::alter()
                        .table(Invoices::Table)
                        .drop_column(Invoices::InvoiceNumber)
                        .to_owned(),
                )
                .await
        }
    }

    /// Add a column, ignoring the failure when the column is already there.
    async fn add_column_tolerant<T>(
        manager: &SchemaManager<'_>,
        table: T,
        mut column: ColumnDef,
    ) -> Result<(), DbErr>
    where
        T: Iden + Copy + 'static,
    {
        let table_name = table.to_string();
        let column_name = column.get_column_name();

        let result = manager
            .alter_table(Table::alter().table(table).add_column(&mut column).to_owned())
            .await;

        if let Err(err) = result {
            if !manager.has_column(&table_name, &column_name).await? {
                return Err(err);
            }
            tracing::debug!(
                table = %table_name,
                column = %column_name,
                error = %err,
                "Column already present, skipping"
            );
        }

        Ok(())
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Invoices {
        Table,
        InvoiceNumber,
        Notes,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum InvoiceLineItems {
        Table,
        Position,
    }
}
