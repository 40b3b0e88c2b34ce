use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::GeoLocation;

/// Unique vendor identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VendorId(pub String);

/// KYC state of a registered vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

/// A street-food vendor registered on the platform.
///
/// `stall_location` is optional: vendors register before pinning their stall,
/// and until it is set they are excluded from all geo-matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    pub phone: Option<String>,
    pub stall_address: Option<String>,
    pub stall_location: Option<GeoLocation>,
    pub verification_status: VerificationStatus,
    /// Credit limit in rupees.
    pub credit_limit: f64,
    /// Cumulative savings attributed from past group buys, in rupees.
    pub total_savings: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    /// True if the vendor can participate in geo-matching.
    pub fn has_stall_location(&self) -> bool {
        self.stall_location.is_some()
    }
}
