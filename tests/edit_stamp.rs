mod common;

use chrono::{TimeZone, Utc};
use common::{test_config, MockIdentity, MockSheet};
use intake_sync::components::edit_stamp::{EditNotification, EditOutcome, EditStampWorkflow};
use intake_sync::components::sheets::CellRef;
use std::sync::Arc;

fn setup() -> (Arc<MockSheet>, EditStampWorkflow) {
    let sheet = Arc::new(MockSheet::with_sheet("Contacts", 4));
    let workflow = EditStampWorkflow::new(sheet.clone(), Arc::new(MockIdentity("staff@example.org")));
    (sheet, workflow)
}

fn edit(sheet: &str, row: u32, column: u32, value: Option<&str>) -> EditNotification {
    EditNotification {
        sheet: sheet.to_string(),
        range: Some(CellRef::new(row, column)),
        value: value.map(str::to_string),
        user: None,
    }
}

#[tokio::test]
async fn test_checking_box_stamps_user_and_time() {
    let (sheet, workflow) = setup();
    let now = Utc.with_ymd_and_hms(2026, 10, 17, 14, 5, 9).unwrap();

    let outcome = workflow
        .on_edit(&test_config(), Some(&edit("Contacts", 7, 11, Some("TRUE"))), now)
        .await
        .unwrap();

    let stamp = "staff@example.org @ Sat Oct 17 2026 14:05:09 GMT+0000";
    assert_eq!(
        outcome,
        EditOutcome::Stamped {
            cell: CellRef::new(7, 12),
            stamp: stamp.to_string(),
        }
    );
    assert_eq!(sheet.cell("Contacts", CellRef::new(7, 12)), stamp);
}

#[tokio::test]
async fn test_unchecking_box_clears_stamp() {
    let (sheet, workflow) = setup();
    sheet.set_cell("Contacts", CellRef::new(7, 12), "staff@example.org @ earlier");

    let outcome = workflow
        .on_edit(&test_config(), Some(&edit("Contacts", 7, 11, Some("FALSE"))), Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome, EditOutcome::Cleared { cell: CellRef::new(7, 12) });
    assert_eq!(sheet.cell("Contacts", CellRef::new(7, 12)), "");
}

#[tokio::test]
async fn test_cleared_checkbox_clears_stamp() {
    let (sheet, workflow) = setup();
    sheet.set_cell("Contacts", CellRef::new(5, 12), "someone");

    let outcome = workflow
        .on_edit(&test_config(), Some(&edit("Contacts", 5, 11, None)), Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome, EditOutcome::Cleared { cell: CellRef::new(5, 12) });
    assert_eq!(sheet.cell("Contacts", CellRef::new(5, 12)), "");
}

#[tokio::test]
async fn test_other_column_is_ignored() {
    let (sheet, workflow) = setup();
    sheet.set_cell("Contacts", CellRef::new(7, 4), "kept");

    let outcome = workflow
        .on_edit(&test_config(), Some(&edit("Contacts", 7, 3, Some("TRUE"))), Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome, EditOutcome::Ignored);
    assert_eq!(sheet.cell("Contacts", CellRef::new(7, 4)), "kept");
}

#[tokio::test]
async fn test_other_sheet_is_ignored() {
    let (sheet, workflow) = setup();

    let outcome = workflow
        .on_edit(&test_config(), Some(&edit("Archive", 7, 11, Some("TRUE"))), Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome, EditOutcome::Ignored);
    assert!(sheet.rows("Archive").is_empty());
}

#[tokio::test]
async fn test_missing_notification_is_ignored() {
    let (_, workflow) = setup();

    let outcome = workflow.on_edit(&test_config(), None, Utc::now()).await.unwrap();
    assert_eq!(outcome, EditOutcome::Ignored);

    let no_range = EditNotification {
        sheet: "Contacts".to_string(),
        range: None,
        value: Some("TRUE".to_string()),
        user: None,
    };
    let outcome = workflow
        .on_edit(&test_config(), Some(&no_range), Utc::now())
        .await
        .unwrap();
    assert_eq!(outcome, EditOutcome::Ignored);
}

#[tokio::test]
async fn test_configured_offset_moves_stamp() {
    let (sheet, workflow) = setup();
    let mut config = test_config();
    config.checkbox_column = 2;
    config.user_id_column_offset = 3;

    workflow
        .on_edit(&config, Some(&edit("Contacts", 6, 2, Some("TRUE"))), Utc::now())
        .await
        .unwrap();

    assert!(sheet
        .cell("Contacts", CellRef::new(6, 5))
        .starts_with("staff@example.org @ "));
}

#[tokio::test]
async fn test_editor_from_notification_is_stamped() {
    let (sheet, workflow) = setup();
    let now = Utc.with_ymd_and_hms(2026, 10, 17, 14, 5, 9).unwrap();
    let mut notification = edit("Contacts", 9, 11, Some("TRUE"));
    notification.user = Some("editor@example.org".to_string());

    workflow
        .on_edit(&test_config(), Some(&notification), now)
        .await
        .unwrap();

    assert_eq!(
        sheet.cell("Contacts", CellRef::new(9, 12)),
        "editor@example.org @ Sat Oct 17 2026 14:05:09 GMT+0000"
    );

    notification.user = Some("  ".to_string());
    workflow
        .on_edit(&test_config(), Some(&notification), now)
        .await
        .unwrap();

    assert!(sheet
        .cell("Contacts", CellRef::new(9, 12))
        .starts_with("staff@example.org @ "));
}
