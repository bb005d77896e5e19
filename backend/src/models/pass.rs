//! Entry pass model
//!
//! An opaque token bound 1:1 to a confirmed reservation, presented at the
//! gate for entry. Created at most once per reservation, the instant its
//! payment reaches Success; immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A gate entry pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPass {
    /// Unique pass identifier (UUID)
    id: String,

    /// Opaque verification token (cryptographically random UUID v4)
    token: String,

    /// Owning reservation (1:1)
    reservation_id: String,

    /// Issuance timestamp
    issued_at: DateTime<Utc>,
}

impl EntryPass {
    /// Mint a pass for a reservation with a fresh random token.
    pub fn new(reservation_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            token: uuid::Uuid::new_v4().to_string(),
            reservation_id,
            issued_at: Utc::now(),
        }
    }

    /// Get pass ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the verification token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Get owning reservation ID
    pub fn reservation_id(&self) -> &str {
        &self.reservation_id
    }

    /// Get issuance timestamp
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}
