use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer-submitted suspicion report against one medicine.
/// At most one live flag per (medicine_id, customer_id) — enforced by
/// a unique index at the storage layer. Resolution deletes the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineFlag {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub customer_id: Uuid,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Flag enriched with medicine and customer summary fields, as the
/// manufacturer's flags view consumes it. Newest-first ordering is
/// applied by the repository query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagDetail {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub ingredients: String,
    pub dosage_form: String,
    pub strength: String,
    pub diseases: Vec<String>,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub reason: Option<String>,
    pub flagged_at: DateTime<Utc>,
}
