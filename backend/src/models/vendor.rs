//! Vendor directory entry
//!
//! The core keeps only what reservations and pass delivery need: a stable
//! id, the contact email and a display name. Profile CRUD beyond this lives
//! outside the engine.

use serde::{Deserialize, Serialize};

/// A registered vendor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    /// Unique vendor identifier (UUID)
    id: String,

    /// Contact email (unique; also the login identity upstream)
    email: String,

    /// Display/business name used in notifications
    business_name: String,
}

impl Vendor {
    pub fn new(email: String, business_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            business_name,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }
}
