use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Role;

/// Registry actor. Registration and credentials live in the external
/// auth system; this is only the identity/role slice the core consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
}

