mod helpers;

use babydiary::diary::{full_day, update_entry, upsert_entry, DiaryError, EntryPatch};
use babydiary::db;
use helpers::{date, entry_at, row_count, test_db, tz};
use tempfile::TempDir;

#[test]
fn repeated_upsert_is_idempotent_per_slot() {
    let mut conn = test_db();
    let payload = entry_at("2024-03-01T09:00:00+09:00", 40, 1, 0);

    let first = upsert_entry(&mut conn, &payload, &tz()).unwrap().into_entry();
    let second = upsert_entry(&mut conn, &payload, &tz()).unwrap().into_entry();

    assert_eq!(row_count(&conn), 1);
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.counts(), first.counts());
}

#[test]
fn second_payload_wins_and_first_created_at_is_kept() {
    let mut conn = test_db();

    let first = upsert_entry(&mut conn, &entry_at("2024-03-01T21:05:00+09:00", 100, 0, 0), &tz())
        .unwrap()
        .into_entry();
    let second = upsert_entry(&mut conn, &entry_at("2024-03-01T21:40:00+09:00", 0, 1, 1), &tz())
        .unwrap()
        .into_entry();

    assert_eq!(row_count(&conn), 1);
    assert_eq!(second.counts(), EntryPatch { milk: 0, urine: 1, poop: 1 });
    assert_eq!(second.created_at, first.created_at);
}

#[test]
fn both_ends_of_an_hour_share_a_slot() {
    let mut conn = test_db();

    upsert_entry(&mut conn, &entry_at("2024-03-01T07:59:59+09:00", 1, 0, 0), &tz()).unwrap();
    upsert_entry(&mut conn, &entry_at("2024-03-01T07:00:01+09:00", 2, 0, 0), &tz()).unwrap();
    upsert_entry(&mut conn, &entry_at("2024-03-01T08:00:00+09:00", 3, 0, 0), &tz()).unwrap();

    assert_eq!(row_count(&conn), 2);
    let slots = full_day(&conn, date("2024-03-01"), &tz()).unwrap();
    assert_eq!(slots[7].milk, 2);
    assert_eq!(slots[8].milk, 3);
}

#[test]
fn update_by_id_rejects_bad_flags_without_writing() {
    let mut conn = test_db();
    let created = upsert_entry(&mut conn, &entry_at("2024-03-01T12:00:00+09:00", 5, 0, 0), &tz())
        .unwrap()
        .into_entry();
    let id = created.id.unwrap();

    let err = update_entry(&conn, id, &EntryPatch { milk: 5, urine: 0, poop: 7 }, &tz()).unwrap_err();
    assert!(matches!(err, DiaryError::InvalidInput(_)));

    let slots = full_day(&conn, date("2024-03-01"), &tz()).unwrap();
    assert_eq!(slots[12].poop, 0);
}

#[test]
fn concurrent_writers_do_not_duplicate_a_slot() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("diary.db");
    db::open_database(&db_path).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let db_path = db_path.clone();
            std::thread::spawn(move || {
                let mut conn = db::open_database(&db_path).unwrap();
                for i in 0..10 {
                    let entry = entry_at("2024-03-01T06:30:00+09:00", worker * 10 + i, 0, 0);
                    upsert_entry(&mut conn, &entry, &tz()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let conn = db::open_database(&db_path).unwrap();
    assert_eq!(row_count(&conn), 1);
}
