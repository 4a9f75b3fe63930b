mod helpers;

use chrono::DateTime;
use dscan_app::{DocumentScanner, PathScanner};
use dscan_core::constants::{MSG_DELETED, MSG_INSERTED, MSG_UPDATED};
use dscan_core::{DocumentRecord, Notice, Resource};
use dscan_db::{Database, DocumentStore, SqliteDocumentStore};
use helpers::{wait_for_list, TestApp};

fn record(id: &str, name: &str, millis: i64) -> DocumentRecord {
    DocumentRecord {
        id: id.to_string(),
        name: name.to_string(),
        size_bytes: 512,
        last_modified: DateTime::from_timestamp_millis(millis).unwrap(),
    }
}

#[tokio::test]
async fn test_insert_update_delete_scenario() {
    let app = TestApp::new().await;
    let controller = &app.controller;
    let mut notices = controller.take_notices().unwrap();
    let mut docs = controller.documents();

    assert_eq!(controller.current_documents(), Resource::Idle);
    controller.start();
    wait_for_list(&mut docs, |d| d.is_empty()).await;

    let a = record("a", "a.pdf", 1_000);
    let b = record("b", "b.pdf", 2_000);
    controller.insert_document(a.clone()).await.unwrap();
    controller.insert_document(b.clone()).await.unwrap();

    let list = wait_for_list(&mut docs, |d| d.len() == 2).await;
    assert_eq!(list, vec![b.clone(), a.clone()]);

    let a2 = record("a", "a2.pdf", 3_000);
    controller.update_document(a2.clone()).await.unwrap();
    let list = wait_for_list(&mut docs, |d| d.first().map(|r| r.name.as_str()) == Some("a2.pdf")).await;
    assert_eq!(list, vec![a2.clone(), b.clone()]);

    controller.delete_document(b).await.unwrap();
    let list = wait_for_list(&mut docs, |d| d.len() == 1).await;
    assert_eq!(list, vec![a2]);

    let received: Vec<Notice> = std::iter::from_fn(|| notices.try_recv()).collect();
    assert_eq!(
        received,
        vec![
            Notice::Success(MSG_INSERTED.to_string()),
            Notice::Success(MSG_INSERTED.to_string()),
            Notice::Success(MSG_UPDATED.to_string()),
            Notice::Success(MSG_DELETED.to_string()),
        ]
    );
    assert!(!controller.current_view_state().is_loading());
}

#[tokio::test]
async fn test_scan_rename_share_delete() {
    let app = TestApp::new().await;
    let controller = &app.controller;
    let mut notices = controller.take_notices().unwrap();
    let mut docs = controller.documents();
    controller.start();

    let scan = app.scan_file("capture.pdf", b"%PDF-1.7 page one");
    let outcome = PathScanner::new(&scan).scan().await.unwrap();
    controller.import_scan(outcome).unwrap().await.unwrap();

    let list = wait_for_list(&mut docs, |d| d.len() == 1).await;
    let scanned = list[0].clone();
    assert!(scanned.name.ends_with(".pdf"));
    assert_eq!(scanned.size_bytes, 17);
    assert_eq!(app.managed_files(), vec![scanned.name.clone()]);
    assert_eq!(notices.try_recv(), Some(Notice::Success(MSG_INSERTED.to_string())));

    controller.open_rename_dialog(scanned.clone());
    assert!(controller.current_view_state().rename_dialog_open);
    controller
        .rename_document(scanned.clone(), "invoice.pdf")
        .unwrap()
        .await
        .unwrap();
    assert!(!controller.current_view_state().rename_dialog_open);

    let list = wait_for_list(&mut docs, |d| d.first().map(|r| r.name.as_str()) == Some("invoice.pdf")).await;
    let renamed = list[0].clone();
    assert_eq!(renamed.id, scanned.id);
    assert_eq!(app.managed_files(), vec!["invoice.pdf".to_string()]);
    assert_eq!(notices.try_recv(), Some(Notice::Success(MSG_UPDATED.to_string())));

    let uri = controller.share_uri(&renamed).unwrap();
    assert!(uri.starts_with("file:///"));
    assert!(uri.ends_with("/invoice.pdf"));

    controller.delete_document_with_file(renamed).await.unwrap();
    wait_for_list(&mut docs, |d| d.is_empty()).await;
    assert!(app.managed_files().is_empty());
    assert_eq!(notices.try_recv(), Some(Notice::Success(MSG_DELETED.to_string())));
}

#[tokio::test]
async fn test_rename_onto_existing_file_reports_error() {
    let app = TestApp::new().await;
    let controller = &app.controller;
    let mut notices = controller.take_notices().unwrap();

    std::fs::write(app.config.storage_dir.join("taken.pdf"), b"other").unwrap();
    std::fs::write(app.config.storage_dir.join("mine.pdf"), b"mine").unwrap();
    let mine = record("mine", "mine.pdf", 1_000);
    controller.insert_document(mine.clone()).await.unwrap();
    assert!(!notices.try_recv().unwrap().is_error());

    controller
        .rename_document(mine, "taken.pdf")
        .unwrap()
        .await
        .unwrap();

    let notice = notices.try_recv().unwrap();
    assert!(notice.is_error());
    assert_eq!(
        app.managed_files(),
        vec!["mine.pdf".to_string(), "taken.pdf".to_string()]
    );
}

#[tokio::test]
async fn test_view_state_starts_from_config() {
    let app = TestApp::new().await;
    let controller = &app.controller;
    let mut view = controller.view_state();

    assert_eq!(controller.current_view_state().dark_mode, app.config.dark_mode);
    controller.set_dark_mode(true);
    assert!(view.has_changed().unwrap());
    assert!(view.borrow_and_update().dark_mode);
    app.database.close().await;
}

#[tokio::test]
async fn test_list_follows_writes_from_another_process() {
    let app = TestApp::new().await;
    let controller = &app.controller;
    let mut docs = controller.documents();
    controller.start();
    wait_for_list(&mut docs, |d| d.is_empty()).await;

    // A second CLI invocation opens its own pool on the same file.
    let other = Database::connect(&app.config.database_path).await.unwrap();
    let other_store = SqliteDocumentStore::new(&other);
    let added = record("elsewhere", "elsewhere.pdf", 5_000);
    other_store.insert(&added).await.unwrap();

    let list = wait_for_list(&mut docs, |d| d.len() == 1).await;
    assert_eq!(list, vec![added]);
    other.close().await;
}
