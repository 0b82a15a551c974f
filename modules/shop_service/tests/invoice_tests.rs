//! Integration tests for invoices and their line items

mod common;

use common::*;
use rust_decimal::Decimal;
use shop_service::*;

#[tokio::test]
async fn test_invoice_total_follows_line_items() {
    print_test_header(
        "test_invoice_total_follows_line_items",
        &[
            "2 @ 10.00 + 1 @ 30.00 totals 50.00",
            "Dropping the second item on update leaves 20.00 and one row",
        ],
    );
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();

    let mut draft = invoice(
        &john,
        None,
        vec![item("Oil filter", 2, 1000), item("Labor", 1, 3000)],
    );
    let id = shop.client.add_invoice(draft.clone()).await.unwrap();

    let details = shop.client.get_invoice(&id).await.unwrap().unwrap();
    assert_eq!(details.invoice.total_amount, money(5000));
    assert_eq!(details.invoice.line_items.len(), 2);
    assert_eq!(details.invoice.line_items[0].total_price, money(2000));
    assert_eq!(details.customer_name, "John Doe");
    println!("   ✓ total {}", details.invoice.total_amount);

    draft.line_items.truncate(1);
    assert_eq!(shop.client.update_invoice(&id, draft).await.unwrap(), 1);

    let details = shop.client.get_invoice(&id).await.unwrap().unwrap();
    assert_eq!(details.invoice.total_amount, money(2000));
    assert_eq!(details.invoice.line_items.len(), 1);
    assert_eq!(
        shop.count_where("invoice_line_items", "invoice_id", &id).await,
        1
    );
}

#[tokio::test]
async fn test_line_items_keep_supplied_order() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();

    let names = ["Zinc plug", "Air filter", "Labor", "Brake fluid"];
    let id = shop
        .client
        .add_invoice(invoice(
            &john,
            None,
            names.iter().map(|n| item(n, 1, 500)).collect(),
        ))
        .await
        .unwrap();

    let details = shop.client.get_invoice(&id).await.unwrap().unwrap();
    let stored: Vec<&str> = details
        .invoice
        .line_items
        .iter()
        .map(|i| i.description.as_str())
        .collect();
    assert_eq!(stored, names);
    assert!(details.invoice.line_items.iter().all(|i| i.invoice_id == id));
}

#[tokio::test]
async fn test_invoice_update_no_op_and_unknown_id() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();

    let draft = invoice(&john, None, vec![item("Labor", 3, 4550)]);
    let id = shop.client.add_invoice(draft.clone()).await.unwrap();
    let before = shop.client.get_invoice(&id).await.unwrap().unwrap();

    assert_eq!(shop.client.update_invoice(&id, draft.clone()).await.unwrap(), 0);
    assert_eq!(shop.client.update_invoice("missing", draft).await.unwrap(), 0);

    let after = shop.client.get_invoice(&id).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_header_only_update_keeps_items() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();

    let mut draft = invoice(&john, None, vec![item("Labor", 1, 9000)]);
    let id = shop.client.add_invoice(draft.clone()).await.unwrap();
    let item_id = shop.client.get_invoice(&id).await.unwrap().unwrap().invoice.line_items[0]
        .id
        .clone();

    draft.payment_status = PaymentStatus::Paid;
    draft.invoice_number = Some("INV-0042".to_string());
    draft.notes = Some("Paid in cash".to_string());
    assert_eq!(shop.client.update_invoice(&id, draft).await.unwrap(), 1);

    let details = shop.client.get_invoice(&id).await.unwrap().unwrap();
    assert_eq!(details.invoice.payment_status, PaymentStatus::Paid);
    assert_eq!(details.invoice.invoice_number.as_deref(), Some("INV-0042"));
    assert_eq!(details.invoice.notes.as_deref(), Some("Paid in cash"));
    assert_eq!(details.invoice.line_items[0].id, item_id);
}

#[tokio::test]
async fn test_item_only_update_counts_as_change() {
    print_test_header(
        "test_item_only_update_counts_as_change",
        &["Renaming a line item leaves header and total alone but is still an update"],
    );
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();

    let mut draft = invoice(&john, None, vec![item("Oil filter", 2, 1000), item("Labor", 1, 3000)]);
    let id = shop.client.add_invoice(draft.clone()).await.unwrap();

    draft.line_items[0].description = "Oil filter (OEM)".to_string();
    assert_eq!(shop.client.update_invoice(&id, draft.clone()).await.unwrap(), 1);

    let details = shop.client.get_invoice(&id).await.unwrap().unwrap();
    assert_eq!(details.invoice.line_items[0].description, "Oil filter (OEM)");
    assert_eq!(details.invoice.total_amount, money(5000));
    assert_eq!(shop.stored_invoice_total(&id).await, money(5000));

    // Same edit again is a no-op
    assert_eq!(shop.client.update_invoice(&id, draft).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_line_item_insert_leaves_no_invoice() {
    print_test_header(
        "test_failed_line_item_insert_leaves_no_invoice",
        &["A failing line item aborts the header insert too"],
    );
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();
    shop.fail_line_item_insert("boom").await;

    let err = shop
        .client
        .add_invoice(invoice(&john, None, vec![item("Labor", 1, 1000), item("boom", 1, 1)]))
        .await
        .unwrap_err();
    println!("   ✓ rejected: {}", err);
    assert!(matches!(err, ShopError::Persistence { .. }), "got {err:?}");

    assert_eq!(shop.count("invoices").await, 0);
    assert_eq!(shop.count("invoice_line_items").await, 0);
}

#[tokio::test]
async fn test_failed_item_replacement_keeps_old_invoice() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();

    let mut draft = invoice(&john, None, vec![item("Labor", 1, 1000)]);
    let id = shop.client.add_invoice(draft.clone()).await.unwrap();
    let before = shop.client.get_invoice(&id).await.unwrap().unwrap();

    shop.fail_line_item_insert("boom").await;
    draft.payment_status = PaymentStatus::Cancelled;
    draft.line_items = vec![item("Labor", 2, 1000), item("boom", 1, 1)];
    let err = shop.client.update_invoice(&id, draft).await.unwrap_err();
    assert!(err.is_persistence());

    let after = shop.client.get_invoice(&id).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_invoice_validation() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();

    let err = shop.client.add_invoice(invoice(&john, None, vec![])).await.unwrap_err();
    assert!(matches!(err, ShopError::Validation { .. }));

    let err = shop
        .client
        .add_invoice(invoice(&john, None, vec![item("Labor", 0, 1000)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::Validation { .. }));

    let err = shop
        .client
        .add_invoice(invoice("ghost", None, vec![item("Labor", 1, 1000)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::NotFound { resource: "customer", .. }));

    let err = shop
        .client
        .add_invoice(invoice(&john, Some("ghost-task"), vec![item("Labor", 1, 1000)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::NotFound { resource: "task", .. }));

    assert_eq!(shop.count("invoices").await, 0);
}

#[tokio::test]
async fn test_fractional_quantities_are_exact() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();

    let id = shop
        .client
        .add_invoice(invoice(
            &john,
            None,
            vec![
                LineItemDraft::new("Labor hours", Decimal::new(15, 1), money(8000)),
                LineItemDraft::new("Coolant (L)", Decimal::new(25, 1), money(400)),
            ],
        ))
        .await
        .unwrap();

    let details = shop.client.get_invoice(&id).await.unwrap().unwrap();
    assert_eq!(details.invoice.line_items[0].total_price, money(12000));
    assert_eq!(details.invoice.line_items[1].total_price, money(1000));
    assert_eq!(details.invoice.total_amount, money(13000));
}

#[tokio::test]
async fn test_invoice_listing_order_and_filters() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();
    let jane = shop.client.add_customer(customer("Jane Smith")).await.unwrap();
    let brakes = shop.client.add_task(task(&john, None, "Brakes")).await.unwrap();

    let mut a = invoice(&john, Some(&brakes), vec![item("Pads", 1, 5000)]);
    a.issue_date = date(2025, 5, 1);
    a.invoice_number = Some("INV-001".to_string());
    let a = shop.client.add_invoice(a).await.unwrap();

    let mut b = invoice(&jane, None, vec![item("Tires", 4, 10000)]);
    b.issue_date = date(2025, 6, 1);
    b.invoice_number = Some("INV-002".to_string());
    b.payment_status = PaymentStatus::Paid;
    let b = shop.client.add_invoice(b).await.unwrap();

    let mut c = invoice(&john, None, vec![item("Wipers", 2, 1500)]);
    c.issue_date = date(2025, 6, 1);
    c.invoice_number = Some("INV-003".to_string());
    let c = shop.client.add_invoice(c).await.unwrap();

    let all = shop.client.list_invoices(InvoiceFilter::default()).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|d| d.invoice.id.as_str()).collect();
    assert_eq!(ids, vec![c.as_str(), b.as_str(), a.as_str()]);
    assert!(all.iter().all(|d| !d.invoice.line_items.is_empty()));

    let from_task = all.iter().find(|d| d.invoice.id == a).unwrap();
    assert_eq!(from_task.task_title.as_deref(), Some("Brakes"));
    assert_eq!(from_task.customer_name, "John Doe");

    let johns = shop
        .client
        .list_invoices(InvoiceFilter {
            customer_id: Some(john.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(johns.len(), 2);

    let for_task = shop
        .client
        .list_invoices(InvoiceFilter {
            task_id: Some(brakes.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(for_task.len(), 1);
    assert_eq!(for_task[0].invoice.id, a);

    let paid = shop
        .client
        .list_invoices(InvoiceFilter {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].invoice.id, b);
    assert_eq!(paid[0].invoice.total_amount, money(40000));
}

#[tokio::test]
async fn test_delete_invoice_removes_its_items_only() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();

    let doomed = shop
        .client
        .add_invoice(invoice(&john, None, vec![item("A", 1, 100), item("B", 1, 200)]))
        .await
        .unwrap();
    let kept = shop
        .client
        .add_invoice(invoice(&john, None, vec![item("C", 1, 300)]))
        .await
        .unwrap();

    assert_eq!(shop.client.delete_invoice(&doomed).await.unwrap(), 1);
    assert_eq!(shop.client.delete_invoice(&doomed).await.unwrap(), 0);

    assert!(shop.client.get_invoice(&doomed).await.unwrap().is_none());
    assert_eq!(shop.count_where("invoice_line_items", "invoice_id", &doomed).await, 0);
    assert_eq!(shop.count_where("invoice_line_items", "invoice_id", &kept).await, 1);
}
