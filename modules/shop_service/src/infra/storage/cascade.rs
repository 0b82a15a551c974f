//! Ownership graph and cascade deletion
//!
//! Every table that must not outlive a parent row is listed once in
//! [`OWNERSHIP`]. [`delete`] walks that graph from any root, collecting the
//! affected ids table by table in parent-first order, then removes them
//! dependents-first. Callers run it inside a transaction.

use rust_decimal::Decimal;
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use std::collections::{BTreeMap, BTreeSet};

use super::entity::{invoice, invoice_line_item};

/// A table taking part in the ownership graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    Customer,
    Vehicle,
    Task,
    Invoice,
    InvoiceLineItem,
    ScheduleEntry,
    Photo,
}

impl Node {
    /// Parents always precede their dependents
    pub const TOPOLOGICAL: [Node; 7] = [
        Node::Customer,
        Node::Vehicle,
        Node::Task,
        Node::Invoice,
        Node::InvoiceLineItem,
        Node::ScheduleEntry,
        Node::Photo,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Node::Customer => "customers",
            Node::Vehicle => "vehicles",
            Node::Task => "tasks",
            Node::Invoice => "invoices",
            Node::InvoiceLineItem => "invoice_line_items",
            Node::ScheduleEntry => "schedule_entries",
            Node::Photo => "photos",
        }
    }
}

/// One parent -> dependent relationship
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub parent: Node,
    pub child: Node,
    /// Column of `child` holding the parent id
    pub link: &'static str,
    /// Extra `(column, value)` match on the child, for polymorphic links
    pub discriminator: Option<(&'static str, &'static str)>,
    /// When the parent itself is being deleted, keep the child and clear `link`
    pub retain_when_root: bool,
}

const fn owns(parent: Node, child: Node, link: &'static str) -> Edge {
    Edge {
        parent,
        child,
        link,
        discriminator: None,
        retain_when_root: false,
    }
}

const fn photos_of(parent: Node, parent_type: &'static str) -> Edge {
    Edge {
        parent,
        child: Node::Photo,
        link: "parent_id",
        discriminator: Some(("parent_type", parent_type)),
        retain_when_root: false,
    }
}

pub const OWNERSHIP: &[Edge] = &[
    owns(Node::Customer, Node::Vehicle, "customer_id"),
    owns(Node::Customer, Node::Task, "customer_id"),
    owns(Node::Vehicle, Node::Task, "vehicle_id"),
    owns(Node::Customer, Node::Invoice, "customer_id"),
    // Billing history outlives a task deleted on its own; its line items do not
    Edge {
        parent: Node::Task,
        child: Node::Invoice,
        link: "task_id",
        discriminator: None,
        retain_when_root: true,
    },
    owns(Node::Invoice, Node::InvoiceLineItem, "invoice_id"),
    owns(Node::Task, Node::ScheduleEntry, "task_id"),
    photos_of(Node::Customer, "customer"),
    photos_of(Node::Vehicle, "vehicle"),
    photos_of(Node::Task, "task"),
];

/// Rows reached from a root, split into those to delete and those to detach
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Plan {
    pub delete: BTreeMap<Node, BTreeSet<String>>,
    /// Retained rows and the link column to clear on each
    pub detach: BTreeMap<Node, (&'static str, BTreeSet<String>)>,
}

impl Plan {
    fn reached(&self, node: Node) -> impl Iterator<Item = &String> {
        let deleted = self.delete.get(&node).into_iter().flatten();
        let detached = self.detach.get(&node).into_iter().flat_map(|(_, ids)| ids);
        deleted.chain(detached)
    }
}

/// Collect every row owned, directly or transitively, by `root`/`id`.
pub async fn plan<C: ConnectionTrait>(conn: &C, root: Node, id: &str) -> Result<Plan, DbErr> {
    let backend = conn.get_database_backend();
    let mut plan = Plan::default();
    plan.delete
        .entry(root)
        .or_default()
        .insert(id.to_string());

    for node in Node::TOPOLOGICAL {
        for edge in OWNERSHIP.iter().filter(|e| e.child == node) {
            let parent_ids: Vec<String> = plan.reached(edge.parent).cloned().collect();
            if parent_ids.is_empty() {
                continue;
            }

            let mut select = Query::select();
            select
                .column(Alias::new("id"))
                .from(Alias::new(node.table()))
                .and_where(Expr::col(Alias::new(edge.link)).is_in(parent_ids));
            if let Some((column, value)) = edge.discriminator {
                select.and_where(Expr::col(Alias::new(column)).eq(value));
            }

            let rows = conn.query_all(backend.build(&select)).await?;
            let mut ids = BTreeSet::new();
            for row in rows {
                ids.insert(row.try_get::<String>("", "id")?);
            }
            if ids.is_empty() {
                continue;
            }

            if edge.retain_when_root && edge.parent == root {
                let (_, retained) = plan
                    .detach
                    .entry(node)
                    .or_insert_with(|| (edge.link, BTreeSet::new()));
                retained.extend(ids);
            } else {
                plan.delete.entry(node).or_default().extend(ids);
            }
        }

        // Deletion wins over retention when both paths reach a row
        if let (Some(deleted), Some((_, retained))) =
            (plan.delete.get(&node), plan.detach.get_mut(&node))
        {
            retained.retain(|id| !deleted.contains(id));
        }
    }

    Ok(plan)
}

/// Apply a plan dependents-first. Returns the number of `root` rows removed.
pub async fn apply<C: ConnectionTrait>(conn: &C, root: Node, plan: &Plan) -> Result<u64, DbErr> {
    let backend = conn.get_database_backend();
    let mut root_rows = 0;

    for node in Node::TOPOLOGICAL.into_iter().rev() {
        if let Some((link, ids)) = plan.detach.get(&node).filter(|(_, ids)| !ids.is_empty()) {
            let mut update = Query::update();
            update
                .table(Alias::new(node.table()))
                .value(Alias::new(*link), Option::<String>::None)
                .and_where(Expr::col(Alias::new("id")).is_in(ids.iter().cloned()));
            let detached = conn.execute(backend.build(&update)).await?.rows_affected();
            tracing::debug!(table = node.table(), rows = detached, "Detached retained rows");

            // Dependents are gone by now; retained invoices keep a matching total
            if node == Node::Invoice {
                refresh_invoice_totals(conn, ids).await?;
            }
        }

        if let Some(ids) = plan.delete.get(&node).filter(|ids| !ids.is_empty()) {
            let mut delete = Query::delete();
            delete
                .from_table(Alias::new(node.table()))
                .and_where(Expr::col(Alias::new("id")).is_in(ids.iter().cloned()));
            let removed = conn.execute(backend.build(&delete)).await?.rows_affected();
            tracing::debug!(table = node.table(), rows = removed, "Cascade delete");
            if node == root {
                root_rows = removed;
            }
        }
    }

    Ok(root_rows)
}

/// Rewrite `total_amount` of `ids` from the line items they still have
async fn refresh_invoice_totals<C: ConnectionTrait>(
    conn: &C,
    ids: &BTreeSet<String>,
) -> Result<(), DbErr> {
    let items = invoice_line_item::Entity::find()
        .filter(invoice_line_item::Column::InvoiceId.is_in(ids.iter().cloned()))
        .all(conn)
        .await?;

    let mut totals: BTreeMap<&str, Decimal> =
        ids.iter().map(|id| (id.as_str(), Decimal::ZERO)).collect();
    for item in &items {
        if let Some(total) = totals.get_mut(item.invoice_id.as_str()) {
            *total += item.total_price;
        }
    }

    for (id, total) in totals {
        invoice::Entity::update_many()
            .col_expr(invoice::Column::TotalAmount, Expr::value(total))
            .filter(invoice::Column::Id.eq(id))
            .exec(conn)
            .await?;
        tracing::debug!(invoice_id = id, total = %total, "Retained invoice total refreshed");
    }
    Ok(())
}

/// Plan and apply a cascade from `root`/`id`
pub async fn delete<C: ConnectionTrait>(conn: &C, root: Node, id: &str) -> Result<u64, DbErr> {
    let plan = plan(conn, root, id).await?;
    apply(conn, root, &plan).await
}
