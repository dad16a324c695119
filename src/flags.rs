//! Flag workflow: customer suspicion reports and manufacturer
//! resolution.
//!
//! The at-most-one-flag-per-(medicine, customer) invariant is enforced
//! by the storage layer's unique index, not here; this module performs
//! one atomic insert and classifies the constraint errors, so
//! concurrent duplicate attempts resolve to exactly one success.
//! A flag has two states: created, then resolved (deleted). Nothing in
//! between is persisted.

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::models::{FlagDetail, MedicineFlag};

#[derive(Error, Debug)]
pub enum FlagError {
    /// This customer already has a live flag on this medicine.
    #[error("Medicine already flagged by this customer")]
    Duplicate,

    #[error("Medicine not found: {0}")]
    MedicineNotFound(Uuid),

    #[error("Unknown customer: {0}")]
    UnknownCustomer(Uuid),

    #[error("Flag not found: {0}")]
    FlagNotFound(Uuid),

    /// The flag's medicine belongs to a different manufacturer.
    #[error("Flag belongs to another manufacturer's medicine")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Record a customer's suspicion report. Returns the new flag id.
pub fn flag_medicine(
    conn: &Connection,
    medicine_id: Uuid,
    customer_id: Uuid,
    reason: Option<String>,
) -> Result<Uuid, FlagError> {
    let medicine = repository::get_medicine(conn, &medicine_id)?
        .ok_or(FlagError::MedicineNotFound(medicine_id))?;

    // With the customer verified up front, a foreign-key failure on the
    // insert can only mean the medicine vanished underneath us.
    repository::get_user(conn, &customer_id)?
        .ok_or(FlagError::UnknownCustomer(customer_id))?;

    let flag = MedicineFlag {
        id: Uuid::new_v4(),
        medicine_id,
        customer_id,
        reason,
        created_at: Utc::now(),
    };

    match repository::insert_flag(conn, &flag) {
        Ok(()) => {}
        // Unique index hit: someone (or this customer, twice) raced us.
        Err(e) if e.is_unique_violation() => return Err(FlagError::Duplicate),
        // Medicine deleted between the existence check and the insert.
        Err(e) if e.is_foreign_key_violation() => {
            return Err(FlagError::MedicineNotFound(medicine_id))
        }
        Err(e) => return Err(e.into()),
    }

    // Notification delivery is out of scope; the log line stands in.
    tracing::warn!(
        medicine = %medicine.name,
        manufacturer_id = %medicine.manufacturer_id,
        reason = flag.reason.as_deref().unwrap_or("not specified"),
        "medicine flagged as suspicious"
    );

    Ok(flag.id)
}

/// Flags raised against the caller's medicines, newest-first.
pub fn flags_for_manufacturer(
    conn: &Connection,
    manufacturer_id: Uuid,
) -> Result<Vec<FlagDetail>, FlagError> {
    Ok(repository::get_flags_for_manufacturer(conn, &manufacturer_id)?)
}

/// Resolve (delete) a flag. Only the manufacturer owning the flagged
/// medicine may resolve it; no audit record is kept.
pub fn resolve_flag(
    conn: &Connection,
    flag_id: Uuid,
    requesting_manufacturer_id: Uuid,
) -> Result<(), FlagError> {
    let flag = repository::get_flag(conn, &flag_id)?
        .ok_or(FlagError::FlagNotFound(flag_id))?;

    let medicine = repository::get_medicine(conn, &flag.medicine_id)?
        .ok_or(FlagError::FlagNotFound(flag_id))?;

    if medicine.manufacturer_id != requesting_manufacturer_id {
        // Misuse signal: someone tried to resolve a flag they don't own.
        tracing::warn!(
            flag_id = %flag_id,
            owner = %medicine.manufacturer_id,
            requester = %requesting_manufacturer_id,
            "rejected cross-manufacturer flag resolution"
        );
        return Err(FlagError::Forbidden);
    }

    repository::delete_flag(conn, &flag_id)?;
    tracing::info!(flag_id = %flag_id, manufacturer_id = %requesting_manufacturer_id, "flag resolved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{count_flags_for_medicine, get_flag, insert_medicine, insert_user};
    use crate::db::sqlite::{open_database, open_memory_database};
    use crate::models::enums::Role;
    use crate::models::{Medicine, User};
    use chrono::NaiveDate;

    fn seed_user(conn: &Connection, role: Role) -> Uuid {
        let id = Uuid::new_v4();
        insert_user(
            conn,
            &User {
                id,
                name: Some("Test User".into()),
                email: format!("{id}@example.com"),
                role,
            },
        )
        .unwrap();
        id
    }

    fn seed_medicine(conn: &Connection, manufacturer_id: Uuid) -> Uuid {
        let med = Medicine {
            id: Uuid::new_v4(),
            name: "Dolo 650".into(),
            batch_number: "A123456".into(),
            expiry_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
            ingredients: "Paracetamol 650mg".into(),
            dosage_form: "Tablet".into(),
            strength: "650mg".into(),
            diseases: vec!["fever".into()],
            manufacturer_id,
            created_at: Utc::now(),
        };
        insert_medicine(conn, &med).unwrap();
        med.id
    }

    #[test]
    fn flagging_creates_exactly_one_flag() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, mfr);

        let flag_id = flag_medicine(&conn, med, customer, Some("looks fake".into())).unwrap();
        let stored = get_flag(&conn, &flag_id).unwrap().unwrap();
        assert_eq!(stored.medicine_id, med);
        assert_eq!(stored.customer_id, customer);
        assert_eq!(stored.reason.as_deref(), Some("looks fake"));
    }

    #[test]
    fn second_flag_from_same_customer_is_duplicate() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, mfr);

        flag_medicine(&conn, med, customer, None).unwrap();
        let err = flag_medicine(&conn, med, customer, Some("again".into())).unwrap_err();
        assert!(matches!(err, FlagError::Duplicate));
        // The first flag survives untouched.
        assert_eq!(count_flags_for_medicine(&conn, &med).unwrap(), 1);
    }

    #[test]
    fn different_customers_can_flag_the_same_medicine() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let med = seed_medicine(&conn, mfr);

        let a = seed_user(&conn, Role::Customer);
        let b = seed_user(&conn, Role::Customer);
        flag_medicine(&conn, med, a, None).unwrap();
        flag_medicine(&conn, med, b, None).unwrap();
        assert_eq!(count_flags_for_medicine(&conn, &med).unwrap(), 2);
    }

    #[test]
    fn unknown_medicine_is_not_found() {
        let conn = open_memory_database().unwrap();
        let customer = seed_user(&conn, Role::Customer);

        let err = flag_medicine(&conn, Uuid::new_v4(), customer, None).unwrap_err();
        assert!(matches!(err, FlagError::MedicineNotFound(_)));
    }

    #[test]
    fn unknown_customer_is_rejected_before_insert() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let med = seed_medicine(&conn, mfr);

        let err = flag_medicine(&conn, med, Uuid::new_v4(), None).unwrap_err();
        assert!(matches!(err, FlagError::UnknownCustomer(_)));
        assert_eq!(count_flags_for_medicine(&conn, &med).unwrap(), 0);
    }

    #[test]
    fn concurrent_duplicate_flags_resolve_to_one_success() {
        use std::sync::{Arc, Barrier};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flags.db");

        let setup = open_database(&path).unwrap();
        let mfr = seed_user(&setup, Role::Manufacturer);
        let customer = seed_user(&setup, Role::Customer);
        let med = seed_medicine(&setup, mfr);
        drop(setup);

        // Two connections race the same (medicine, customer) insert;
        // the unique index must let exactly one through.
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let conn = open_database(&path).unwrap();
                    barrier.wait();
                    flag_medicine(&conn, med, customer, None)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let duplicates = results
            .iter()
            .filter(|r| matches!(r, Err(FlagError::Duplicate)))
            .count();
        assert_eq!(successes, 1, "results: {results:?}");
        assert_eq!(duplicates, 1, "results: {results:?}");

        let conn = open_database(&path).unwrap();
        assert_eq!(count_flags_for_medicine(&conn, &med).unwrap(), 1);
    }

    #[test]
    fn resolve_deletes_the_flag() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, mfr);

        let flag_id = flag_medicine(&conn, med, customer, None).unwrap();
        resolve_flag(&conn, flag_id, mfr).unwrap();
        assert!(get_flag(&conn, &flag_id).unwrap().is_none());
    }

    #[test]
    fn resolving_twice_reports_stale_flag() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, mfr);

        let flag_id = flag_medicine(&conn, med, customer, None).unwrap();
        resolve_flag(&conn, flag_id, mfr).unwrap();
        // Resolving again: the flag is gone, callers get a stale-id error.
        let err = resolve_flag(&conn, flag_id, mfr).unwrap_err();
        assert!(matches!(err, FlagError::FlagNotFound(_)));
    }

    #[test]
    fn cross_manufacturer_resolve_is_forbidden_and_keeps_flag() {
        let conn = open_memory_database().unwrap();
        let owner = seed_user(&conn, Role::Manufacturer);
        let intruder = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, owner);

        let flag_id = flag_medicine(&conn, med, customer, None).unwrap();
        let err = resolve_flag(&conn, flag_id, intruder).unwrap_err();
        assert!(matches!(err, FlagError::Forbidden));
        assert!(get_flag(&conn, &flag_id).unwrap().is_some());
    }

    #[test]
    fn listing_returns_details_for_owner_only() {
        let conn = open_memory_database().unwrap();
        let owner = seed_user(&conn, Role::Manufacturer);
        let other = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, owner);

        flag_medicine(&conn, med, customer, Some("discolored tablets".into())).unwrap();

        let mine = flags_for_manufacturer(&conn, owner).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].medicine_name, "Dolo 650");
        assert_eq!(mine[0].reason.as_deref(), Some("discolored tablets"));
        assert!(flags_for_manufacturer(&conn, other).unwrap().is_empty());
    }
}
