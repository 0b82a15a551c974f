//! Integration tests for photos and schedule entries

mod common;

use chrono::NaiveTime;
use common::*;
use shop_service::*;

fn photo(parent: PhotoParent, uri: &str) -> PhotoDraft {
    PhotoDraft {
        id: None,
        parent,
        uri: uri.to_string(),
        notes: None,
    }
}

fn at(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

#[tokio::test]
async fn test_photos_listed_in_insertion_order() {
    print_test_header(
        "test_photos_listed_in_insertion_order",
        &["Photos of a parent come back in the order they were added"],
    );
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();
    let car = shop
        .client
        .add_vehicle(vehicle(&john, "Toyota", "Camry", None))
        .await
        .unwrap();
    let parent = PhotoParent::Vehicle(car.clone());

    // Ids sort opposite to insertion order
    let uris = ["file:///c.jpg", "file:///b.jpg", "file:///a.jpg"];
    for (n, uri) in uris.iter().enumerate() {
        let mut draft = photo(parent.clone(), uri);
        draft.id = Some(format!("photo-{}", 9 - n));
        shop.client.add_photo(draft).await.unwrap();
    }
    shop.client
        .add_photo(photo(PhotoParent::Customer(john.clone()), "file:///owner.jpg"))
        .await
        .unwrap();

    let photos = shop.client.list_photos(&parent).await.unwrap();
    let listed: Vec<&str> = photos.iter().map(|p| p.uri.as_str()).collect();
    assert_eq!(listed, uris);
    assert!(photos.iter().all(|p| p.parent == parent));

    let owner = shop
        .client
        .list_photos(&PhotoParent::Customer(john))
        .await
        .unwrap();
    assert_eq!(owner.len(), 1);
    assert_eq!(owner[0].parent.kind(), PhotoParentKind::Customer);
}

#[tokio::test]
async fn test_photo_notes_update() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();
    let parent = PhotoParent::Customer(john);
    let id = shop
        .client
        .add_photo(photo(parent.clone(), "file:///dent.jpg"))
        .await
        .unwrap();

    let notes = Some("Dent on rear bumper".to_string());
    assert_eq!(shop.client.update_photo_notes(&id, notes.clone()).await.unwrap(), 1);
    assert_eq!(shop.client.update_photo_notes(&id, notes.clone()).await.unwrap(), 0);
    assert_eq!(shop.client.list_photos(&parent).await.unwrap()[0].notes, notes);

    // Blank notes clear the field
    assert_eq!(
        shop.client
            .update_photo_notes(&id, Some("  ".to_string()))
            .await
            .unwrap(),
        1
    );
    assert_eq!(shop.client.list_photos(&parent).await.unwrap()[0].notes, None);
}

#[tokio::test]
async fn test_photo_validation_and_delete() {
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();
    let parent = PhotoParent::Customer(john);

    let err = shop
        .client
        .add_photo(photo(parent.clone(), ""))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::Validation { .. }));

    let err = shop
        .client
        .add_photo(photo(PhotoParent::Task("ghost".to_string()), "file:///x.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::NotFound { resource: "task", .. }));

    let id = shop
        .client
        .add_photo(photo(parent.clone(), "file:///x.jpg"))
        .await
        .unwrap();
    assert_eq!(shop.client.delete_photo(&id).await.unwrap(), 1);
    assert_eq!(shop.client.delete_photo(&id).await.unwrap(), 0);
    assert!(shop.client.list_photos(&parent).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_schedule_entries_ordered_by_date_and_time() {
    print_test_header(
        "test_schedule_entries_ordered_by_date_and_time",
        &["A task's entries come back by job date, then start time"],
    );
    let shop = TestShop::new().await;
    let john = shop.client.add_customer(customer("John Doe")).await.unwrap();
    let job = shop.client.add_task(task(&john, None, "Engine rebuild")).await.unwrap();
    let other = shop.client.add_task(task(&john, None, "Detailing")).await.unwrap();

    let slots = [
        (date(2025, 6, 3), at(9, 0), "day two"),
        (date(2025, 6, 2), at(13, 0), "day one, afternoon"),
        (date(2025, 6, 2), at(8, 30), "day one, morning"),
    ];
    for (job_date, start_time, notes) in slots {
        shop.client
            .add_schedule_entry(ScheduleEntryDraft {
                task_id: Some(job.clone()),
                job_date: Some(job_date),
                start_time,
                end_time: None,
                notes: Some(notes.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    shop.client
        .add_schedule_entry(ScheduleEntryDraft {
            task_id: Some(other),
            job_date: Some(date(2025, 6, 1)),
            ..Default::default()
        })
        .await
        .unwrap();

    let entries = shop.client.list_schedule_entries(&job).await.unwrap();
    let order: Vec<&str> = entries
        .iter()
        .filter_map(|e| e.notes.as_deref())
        .collect();
    assert_eq!(order, vec!["day one, morning", "day one, afternoon", "day two"]);
    assert_eq!(entries[0].start_time, at(8, 30));

    assert!(shop.client.list_schedule_entries("ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_schedule_entry_needs_existing_task() {
    let shop = TestShop::new().await;

    let err = shop
        .client
        .add_schedule_entry(ScheduleEntryDraft {
            task_id: Some("ghost".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::NotFound { resource: "task", .. }));
    assert_eq!(shop.count("schedule_entries").await, 0);

    // Unattached entries are fine
    shop.client
        .add_schedule_entry(ScheduleEntryDraft {
            job_date: Some(date(2025, 6, 2)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(shop.count("schedule_entries").await, 1);
}
