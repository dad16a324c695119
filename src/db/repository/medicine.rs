use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Medicine, MedicineUpdate};

const MEDICINE_COLUMNS: &str = "id, name, batch_number, expiry_date, ingredients, \
     dosage_form, strength, diseases, manufacturer_id, created_at";

pub fn insert_medicine(conn: &Connection, med: &Medicine) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (id, name, batch_number, expiry_date, ingredients,
         dosage_form, strength, diseases, manufacturer_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            med.id.to_string(),
            med.name,
            med.batch_number,
            med.expiry_date,
            med.ingredients,
            med.dosage_form,
            med.strength,
            serde_json::to_string(&med.diseases)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            med.manufacturer_id.to_string(),
            med.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_medicine(conn: &Connection, id: &Uuid) -> Result<Option<Medicine>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1"),
            params![id.to_string()],
            medicine_row_from_rusqlite,
        )
        .optional()?;

    row.map(medicine_from_row).transpose()
}

/// All medicines in the registry, in a stable (name, id) order.
/// Stage B and Stage C of the lookup pipeline scan this.
pub fn get_all_medicines(conn: &Connection) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines ORDER BY name, id"
    ))?;

    let rows = stmt.query_map([], |row| Ok(medicine_row_from_rusqlite(row)))?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medicine_from_row(row??)?);
    }
    Ok(meds)
}

/// Case-insensitive substring filter over name and batch number.
/// Ordered by (name, id) so the first row is deterministic — the exact
/// lookup stage takes the head of this list.
///
/// The query is matched literally: LIKE metacharacters in user input
/// are escaped so `"_"` or `"d_lo%"` cannot act as wildcards.
pub fn get_medicines_matching(
    conn: &Connection,
    query: &str,
) -> Result<Vec<Medicine>, DatabaseError> {
    let pattern = format!("%{}%", escape_like(query));
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines
         WHERE LOWER(name) LIKE LOWER(?1) ESCAPE '\\'
            OR LOWER(batch_number) LIKE LOWER(?1) ESCAPE '\\'
         ORDER BY name, id"
    ))?;

    let rows = stmt.query_map(params![pattern], |row| Ok(medicine_row_from_rusqlite(row)))?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medicine_from_row(row??)?);
    }
    Ok(meds)
}

/// Neutralize LIKE metacharacters (`%`, `_`) and the escape char itself.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A manufacturer's own registry entries, newest-first.
pub fn get_medicines_for_manufacturer(
    conn: &Connection,
    manufacturer_id: &Uuid,
) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines
         WHERE manufacturer_id = ?1 ORDER BY created_at DESC"
    ))?;

    let rows = stmt.query_map(params![manufacturer_id.to_string()], |row| {
        Ok(medicine_row_from_rusqlite(row))
    })?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medicine_from_row(row??)?);
    }
    Ok(meds)
}

/// Update the mutable descriptive fields only. Identity fields are
/// immutable by design; ownership is checked by the registry layer.
pub fn update_medicine_details(
    conn: &Connection,
    id: &Uuid,
    update: &MedicineUpdate,
    existing: &Medicine,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE medicines SET ingredients = ?2, dosage_form = ?3, strength = ?4 WHERE id = ?1",
        params![
            id.to_string(),
            update.ingredients.as_deref().unwrap_or(&existing.ingredients),
            update.dosage_form.as_deref().unwrap_or(&existing.dosage_form),
            update.strength.as_deref().unwrap_or(&existing.strength),
        ],
    )?;
    Ok(())
}

/// Delete a medicine. Flags cascade in the same implicit transaction
/// via the ON DELETE CASCADE foreign key, so no orphans survive.
pub fn delete_medicine(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM medicines WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

// Internal row type for Medicine mapping
struct MedicineRow {
    id: String,
    name: String,
    batch_number: String,
    expiry_date: NaiveDate,
    ingredients: String,
    dosage_form: String,
    strength: String,
    diseases: String,
    manufacturer_id: String,
    created_at: DateTime<Utc>,
}

fn medicine_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicineRow, rusqlite::Error> {
    Ok(MedicineRow {
        id: row.get(0)?,
        name: row.get(1)?,
        batch_number: row.get(2)?,
        expiry_date: row.get(3)?,
        ingredients: row.get(4)?,
        dosage_form: row.get(5)?,
        strength: row.get(6)?,
        diseases: row.get(7)?,
        manufacturer_id: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn medicine_from_row(row: MedicineRow) -> Result<Medicine, DatabaseError> {
    Ok(Medicine {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name: row.name,
        batch_number: row.batch_number,
        expiry_date: row.expiry_date,
        ingredients: row.ingredients,
        dosage_form: row.dosage_form,
        strength: row.strength,
        diseases: serde_json::from_str(&row.diseases).unwrap_or_default(),
        manufacturer_id: Uuid::parse_str(&row.manufacturer_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        created_at: row.created_at,
    })
}
