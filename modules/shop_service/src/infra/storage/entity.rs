//! SeaORM entities for database tables
//!
//! Enumerations (task status, category, payment status, photo parent type)
//! are stored as their display strings and parsed back in the mapper.

/// Customers table entity
pub mod customer {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "customers")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::vehicle::Entity")]
        Vehicles,
        #[sea_orm(has_many = "super::task::Entity")]
        Tasks,
        #[sea_orm(has_many = "super::invoice::Entity")]
        Invoices,
    }

    impl Related<super::vehicle::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Vehicles.def()
        }
    }

    impl Related<super::task::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Tasks.def()
        }
    }

    impl Related<super::invoice::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Invoices.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Vehicles table entity
pub mod vehicle {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "vehicles")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub customer_id: String,
        pub make: Option<String>,
        pub model: Option<String>,
        pub year: Option<i32>,
        #[sea_orm(unique)]
        pub vin: Option<String>,
        pub engine_type: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// Owner
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id"
        )]
        Customer,
        #[sea_orm(has_many = "super::task::Entity")]
        Tasks,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl Related<super::task::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Tasks.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Tasks table entity
pub mod task {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "tasks")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub vehicle_id: Option<String>,
        pub customer_id: Option<String>,
        pub title: String,
        pub description: Option<String>,
        pub category: Option<String>,
        pub status: String,
        /// Set once on insert
        pub created_date: DateTimeUtc,
        pub due_date: Option<Date>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "super::vehicle::Entity",
            from = "Column::VehicleId",
            to = "super::vehicle::Column::Id"
        )]
        Vehicle,
        #[sea_orm(has_many = "super::invoice::Entity")]
        Invoices,
        #[sea_orm(has_many = "super::schedule_entry::Entity")]
        ScheduleEntries,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl Related<super::vehicle::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Vehicle.def()
        }
    }

    impl Related<super::invoice::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Invoices.def()
        }
    }

    impl Related<super::schedule_entry::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ScheduleEntries.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Invoices table entity
pub mod invoice {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "invoices")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub customer_id: String,
        pub task_id: Option<String>,
        pub invoice_number: Option<String>,
        pub issue_date: Date,
        pub due_date: Option<Date>,
        /// Sum of line item totals as of the last write
        pub total_amount: Decimal,
        pub payment_status: String,
        pub notes: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::customer::Entity",
            from = "Column::CustomerId",
            to = "super::customer::Column::Id"
        )]
        Customer,
        #[sea_orm(
            belongs_to = "super::task::Entity",
            from = "Column::TaskId",
            to = "super::task::Column::Id"
        )]
        Task,
        #[sea_orm(has_many = "super::invoice_line_item::Entity")]
        LineItems,
    }

    impl Related<super::customer::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Customer.def()
        }
    }

    impl Related<super::task::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Task.def()
        }
    }

    impl Related<super::invoice_line_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::LineItems.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Invoice line items table entity
pub mod invoice_line_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "invoice_line_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub invoice_id: String,
        pub description: String,
        pub quantity: Decimal,
        pub unit_price: Decimal,
        pub total_price: Decimal,
        /// Zero-based order within the invoice
        pub position: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::invoice::Entity",
            from = "Column::InvoiceId",
            to = "super::invoice::Column::Id"
        )]
        Invoice,
    }

    impl Related<super::invoice::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Invoice.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Schedule entries table entity
pub mod schedule_entry {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "schedule_entries")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub task_id: Option<String>,
        pub job_date: Option<Date>,
        pub start_time: Option<Time>,
        pub end_time: Option<Time>,
        pub notes: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::task::Entity",
            from = "Column::TaskId",
            to = "super::task::Column::Id"
        )]
        Task,
    }

    impl Related<super::task::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Task.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Photos table entity
///
/// `parent_type` + `parent_id` point at a customer, vehicle or task. There is
/// no foreign key; the cascade graph keeps photos from outliving their parent.
pub mod photo {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "photos")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub parent_id: String,
        pub parent_type: String,
        pub uri: String,
        pub notes: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
