//! Manufacturer-facing registry management.
//!
//! Create/list/update/delete of medicine records, with the ownership
//! rule applied here: an entry is mutated and destroyed only by the
//! manufacturer that created it. Deletion cascades to flags at the
//! storage layer.

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::models::{Medicine, MedicineUpdate, NewMedicine};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Medicine not found: {0}")]
    MedicineNotFound(Uuid),

    /// The medicine belongs to a different manufacturer.
    #[error("Medicine is owned by another manufacturer")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Register a new medicine for `manufacturer_id`. Disease tags are
/// normalized on the way in: trimmed, lowercased, empties dropped,
/// duplicates removed keeping first occurrence.
pub fn create_medicine(
    conn: &Connection,
    manufacturer_id: Uuid,
    new: NewMedicine,
) -> Result<Medicine, RegistryError> {
    let medicine = Medicine {
        id: Uuid::new_v4(),
        name: new.name,
        batch_number: new.batch_number,
        expiry_date: new.expiry_date,
        ingredients: new.ingredients,
        dosage_form: new.dosage_form,
        strength: new.strength,
        diseases: normalize_diseases(new.diseases),
        manufacturer_id,
        created_at: Utc::now(),
    };

    repository::insert_medicine(conn, &medicine)?;
    tracing::info!(medicine = %medicine.name, batch = %medicine.batch_number, "medicine registered");
    Ok(medicine)
}

/// The caller's own entries, newest-first.
pub fn medicines_for_manufacturer(
    conn: &Connection,
    manufacturer_id: Uuid,
) -> Result<Vec<Medicine>, RegistryError> {
    Ok(repository::get_medicines_for_manufacturer(conn, &manufacturer_id)?)
}

/// Update the descriptive fields (ingredients, dosage form, strength).
/// Unset fields keep their stored values. Identity fields never change.
pub fn update_medicine(
    conn: &Connection,
    id: Uuid,
    manufacturer_id: Uuid,
    update: MedicineUpdate,
) -> Result<Medicine, RegistryError> {
    let existing = owned_medicine(conn, id, manufacturer_id)?;
    repository::update_medicine_details(conn, &id, &update, &existing)?;
    repository::get_medicine(conn, &id)?.ok_or(RegistryError::MedicineNotFound(id))
}

/// Delete an entry; its flags go with it atomically (FK cascade).
pub fn delete_medicine(
    conn: &Connection,
    id: Uuid,
    manufacturer_id: Uuid,
) -> Result<(), RegistryError> {
    owned_medicine(conn, id, manufacturer_id)?;
    repository::delete_medicine(conn, &id)?;
    tracing::info!(medicine_id = %id, "medicine deleted");
    Ok(())
}

fn owned_medicine(
    conn: &Connection,
    id: Uuid,
    manufacturer_id: Uuid,
) -> Result<Medicine, RegistryError> {
    let medicine =
        repository::get_medicine(conn, &id)?.ok_or(RegistryError::MedicineNotFound(id))?;
    if medicine.manufacturer_id != manufacturer_id {
        tracing::warn!(
            medicine_id = %id,
            owner = %medicine.manufacturer_id,
            requester = %manufacturer_id,
            "rejected cross-manufacturer medicine mutation"
        );
        return Err(RegistryError::Forbidden);
    }
    Ok(medicine)
}

fn normalize_diseases(raw: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}
