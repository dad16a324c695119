use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{FlagDetail, MedicineFlag};

/// Insert a flag as a single atomic statement. The UNIQUE
/// (medicine_id, customer_id) index rejects duplicates at the storage
/// layer; callers classify the resulting constraint error. There is no
/// check-then-insert window here.
pub fn insert_flag(conn: &Connection, flag: &MedicineFlag) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicine_flags (id, medicine_id, customer_id, reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            flag.id.to_string(),
            flag.medicine_id.to_string(),
            flag.customer_id.to_string(),
            flag.reason,
            flag.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_flag(conn: &Connection, id: &Uuid) -> Result<Option<MedicineFlag>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, medicine_id, customer_id, reason, created_at
             FROM medicine_flags WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, DateTime<Utc>>(4)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, medicine_id, customer_id, reason, created_at)) => Ok(Some(MedicineFlag {
            id: parse_uuid(&id)?,
            medicine_id: parse_uuid(&medicine_id)?,
            customer_id: parse_uuid(&customer_id)?,
            reason,
            created_at,
        })),
        None => Ok(None),
    }
}

/// Flags on a manufacturer's medicines, enriched with medicine and
/// customer summaries, newest-first.
pub fn get_flags_for_manufacturer(
    conn: &Connection,
    manufacturer_id: &Uuid,
) -> Result<Vec<FlagDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.medicine_id, m.name, m.batch_number, m.expiry_date,
                m.ingredients, m.dosage_form, m.strength, m.diseases,
                f.customer_id, c.name, c.email, f.reason, f.created_at
         FROM medicine_flags f
         JOIN medicines m ON f.medicine_id = m.id
         JOIN users c ON f.customer_id = c.id
         WHERE m.manufacturer_id = ?1
         ORDER BY f.created_at DESC",
    )?;

    let rows = stmt.query_map(params![manufacturer_id.to_string()], |row| {
        Ok(FlagDetailRow {
            id: row.get(0)?,
            medicine_id: row.get(1)?,
            medicine_name: row.get(2)?,
            batch_number: row.get(3)?,
            expiry_date: row.get(4)?,
            ingredients: row.get(5)?,
            dosage_form: row.get(6)?,
            strength: row.get(7)?,
            diseases: row.get(8)?,
            customer_id: row.get(9)?,
            customer_name: row.get(10)?,
            customer_email: row.get(11)?,
            reason: row.get(12)?,
            flagged_at: row.get(13)?,
        })
    })?;

    let mut details = Vec::new();
    for row in rows {
        details.push(flag_detail_from_row(row?)?);
    }
    Ok(details)
}

pub fn delete_flag(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM medicine_flags WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

/// Live flags referencing a medicine (cascade verification in tests).
pub fn count_flags_for_medicine(
    conn: &Connection,
    medicine_id: &Uuid,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM medicine_flags WHERE medicine_id = ?1",
        params![medicine_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

// Internal row type for FlagDetail mapping
struct FlagDetailRow {
    id: String,
    medicine_id: String,
    medicine_name: String,
    batch_number: String,
    expiry_date: chrono::NaiveDate,
    ingredients: String,
    dosage_form: String,
    strength: String,
    diseases: String,
    customer_id: String,
    customer_name: Option<String>,
    customer_email: String,
    reason: Option<String>,
    flagged_at: DateTime<Utc>,
}

fn flag_detail_from_row(row: FlagDetailRow) -> Result<FlagDetail, DatabaseError> {
    // Display fallback: name → email → "Anonymous".
    let customer_name = match row.customer_name {
        Some(n) if !n.is_empty() => n,
        _ if !row.customer_email.is_empty() => row.customer_email.clone(),
        _ => "Anonymous".to_string(),
    };

    Ok(FlagDetail {
        id: parse_uuid(&row.id)?,
        medicine_id: parse_uuid(&row.medicine_id)?,
        medicine_name: row.medicine_name,
        batch_number: row.batch_number,
        expiry_date: row.expiry_date,
        ingredients: row.ingredients,
        dosage_form: row.dosage_form,
        strength: row.strength,
        diseases: serde_json::from_str(&row.diseases).unwrap_or_default(),
        customer_id: parse_uuid(&row.customer_id)?,
        customer_name,
        customer_email: row.customer_email,
        reason: row.reason,
        flagged_at: row.flagged_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::medicine::{delete_medicine, insert_medicine};
    use crate::db::repository::user::insert_user;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::Role;
    use crate::models::{Medicine, User};
    use chrono::NaiveDate;

    fn seed_user(conn: &Connection, role: Role) -> Uuid {
        let id = Uuid::new_v4();
        insert_user(
            conn,
            &User {
                id,
                name: None,
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

    fn new_flag(medicine_id: Uuid, customer_id: Uuid) -> MedicineFlag {
        MedicineFlag {
            id: Uuid::new_v4(),
            medicine_id,
            customer_id,
            reason: Some("packaging looks off".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn duplicate_pair_rejected_by_unique_index() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, mfr);

        insert_flag(&conn, &new_flag(med, customer)).unwrap();
        let err = insert_flag(&conn, &new_flag(med, customer)).unwrap_err();
        assert!(err.is_unique_violation(), "expected unique violation, got {err}");
    }

    #[test]
    fn same_customer_may_flag_different_medicines() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med_a = seed_medicine(&conn, mfr);
        let med_b = seed_medicine(&conn, mfr);

        insert_flag(&conn, &new_flag(med_a, customer)).unwrap();
        insert_flag(&conn, &new_flag(med_b, customer)).unwrap();
    }

    #[test]
    fn insert_against_missing_medicine_is_fk_violation() {
        let conn = open_memory_database().unwrap();
        let customer = seed_user(&conn, Role::Customer);

        let err = insert_flag(&conn, &new_flag(Uuid::new_v4(), customer)).unwrap_err();
        assert!(err.is_foreign_key_violation(), "expected FK violation, got {err}");
    }

    #[test]
    fn manufacturer_view_is_enriched_and_newest_first() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, mfr);

        let older = MedicineFlag {
            created_at: Utc::now() - chrono::Duration::hours(2),
            ..new_flag(med, customer)
        };
        insert_flag(&conn, &older).unwrap();

        let other_customer = seed_user(&conn, Role::Customer);
        let newer = new_flag(med, other_customer);
        insert_flag(&conn, &newer).unwrap();

        let details = get_flags_for_manufacturer(&conn, &mfr).unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].id, newer.id);
        assert_eq!(details[1].id, older.id);
        assert_eq!(details[0].medicine_name, "Dolo 650");
        // No name on the seeded user — falls back to email.
        assert!(details[0].customer_name.contains("@example.com"));
    }

    #[test]
    fn flags_scoped_to_owning_manufacturer() {
        let conn = open_memory_database().unwrap();
        let mfr_a = seed_user(&conn, Role::Manufacturer);
        let mfr_b = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, mfr_a);

        insert_flag(&conn, &new_flag(med, customer)).unwrap();

        assert_eq!(get_flags_for_manufacturer(&conn, &mfr_a).unwrap().len(), 1);
        assert!(get_flags_for_manufacturer(&conn, &mfr_b).unwrap().is_empty());
    }

    #[test]
    fn deleting_medicine_cascades_to_flags() {
        let conn = open_memory_database().unwrap();
        let mfr = seed_user(&conn, Role::Manufacturer);
        let customer = seed_user(&conn, Role::Customer);
        let med = seed_medicine(&conn, mfr);

        let flag = new_flag(med, customer);
        insert_flag(&conn, &flag).unwrap();
        assert_eq!(count_flags_for_medicine(&conn, &med).unwrap(), 1);

        delete_medicine(&conn, &med).unwrap();
        assert_eq!(count_flags_for_medicine(&conn, &med).unwrap(), 0);
        assert!(get_flag(&conn, &flag.id).unwrap().is_none());
    }
}
