// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_persistence;
use crate::{PersistenceError, RegistrySeed};
use cuebook_domain::{Rate, TableStatus, TableType};

#[test]
fn test_seeded_registry_is_readable() {
    let mut persistence = create_test_persistence(3);

    let club = persistence.get_club(1).unwrap().unwrap();
    assert_eq!(club.name(), "Corner Pocket");
    assert_eq!(club.timezone(), "UTC");

    let pool: Vec<i32> = persistence
        .list_tables(1, Some(TableType::Pool))
        .unwrap()
        .iter()
        .map(|t| t.table_number)
        .collect();
    assert_eq!(pool, vec![1, 2, 3]);
    assert_eq!(persistence.list_tables(1, None).unwrap().len(), 4);

    let rate = persistence.get_rate(1, TableType::Pool).unwrap().unwrap();
    assert_eq!(rate.price_per_hour, 50_000);
    assert_eq!(persistence.get_rate(1, TableType::Snooker).unwrap(), None);
    assert_eq!(persistence.get_club(99).unwrap(), None);
}

#[test]
fn test_reseeding_replaces_rates() {
    let mut persistence = create_test_persistence(2);

    persistence
        .upsert_rate(&Rate::new(1, TableType::Pool, 60_000).unwrap())
        .unwrap();

    let rate = persistence.get_rate(1, TableType::Pool).unwrap().unwrap();
    assert_eq!(rate.price_per_hour, 60_000);
}

#[test]
fn test_new_tables_start_available() {
    let mut persistence = create_test_persistence(1);

    let tables = persistence.list_tables(1, Some(TableType::Pool)).unwrap();
    assert_eq!(tables[0].status, TableStatus::Available);
}

#[test]
fn test_seed_parses_from_json() {
    let json = r#"{
        "clubs": [
            {"id": 7, "name": "Side Pocket", "timezone": "Asia/Ho_Chi_Minh", "open": 9.0, "close": 23.5}
        ],
        "tables": [
            {"club_id": 7, "table_number": 1, "table_type": "pool", "status": "available"},
            {"club_id": 7, "table_number": 2, "table_type": "carom", "status": "available"}
        ],
        "rates": [
            {"club_id": 7, "table_type": "carom", "price_per_hour": 80000}
        ]
    }"#;

    let seed = RegistrySeed::from_json(json).unwrap();
    assert_eq!(seed.clubs.len(), 1);
    assert_eq!(seed.tables[1].table_type, TableType::Carom);
    assert_eq!(seed.rates[0].price_per_hour, 80_000);
}

#[test]
fn test_seed_rejects_negative_rate() {
    let json = r#"{"rates": [{"club_id": 1, "table_type": "pool", "price_per_hour": -1}]}"#;

    assert!(matches!(
        RegistrySeed::from_json(json),
        Err(PersistenceError::SerializationError(_))
    ));
}
