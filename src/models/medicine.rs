use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registry entry, owned by the manufacturer that created it.
/// Identity fields (name, batch_number, expiry_date, manufacturer_id)
/// are immutable after creation; only the descriptive fields are
/// updatable, and only by the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub ingredients: String,
    pub dosage_form: String,
    pub strength: String,
    /// Lowercase symptom/condition tags, deduped, insertion order kept.
    pub diseases: Vec<String>,
    pub manufacturer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Fields a manufacturer supplies when registering a medicine.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMedicine {
    pub name: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub ingredients: String,
    pub dosage_form: String,
    pub strength: String,
    #[serde(default)]
    pub diseases: Vec<String>,
}

/// Partial update of the mutable fields. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicineUpdate {
    pub ingredients: Option<String>,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
}
