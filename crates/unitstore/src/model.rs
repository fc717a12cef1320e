//! Core assignment types for unitstore.
//!
//! This module defines the records attached to a unit within one project:
//! who owns it and which parking spots it holds.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Map from unit id to its owner record.
pub type OwnerMap = BTreeMap<String, OwnerRecord>;

/// Map from unit id to its parking assignment.
pub type ParkingMap = BTreeMap<String, ParkingAssignment>;

/// Classification of the party attached to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OwnerType {
    /// Purchased the unit to occupy it.
    #[serde(rename = "COMPRADOR")]
    Buyer,
    /// Purchased the unit as an investment.
    #[serde(rename = "INVERSOR")]
    Investor,
    /// Occupies the unit under a lease.
    #[serde(rename = "INQUILINO")]
    Tenant,
}

impl OwnerType {
    /// The tag written to storage.
    #[must_use]
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Buyer => "COMPRADOR",
            Self::Investor => "INVERSOR",
            Self::Tenant => "INQUILINO",
        }
    }
}

impl std::fmt::Display for OwnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_tag())
    }
}

impl FromStr for OwnerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comprador" | "buyer" => Ok(Self::Buyer),
            "inversor" | "investor" => Ok(Self::Investor),
            "inquilino" | "tenant" => Ok(Self::Tenant),
            _ => Err(Error::UnknownOwnerType {
                value: s.to_string(),
            }),
        }
    }
}

/// Contact and classification data supplied when assigning an owner.
///
/// The unit id is not part of the payload; it comes from the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerData {
    /// Owner's full name.
    pub name: String,
    /// Contact email, stored as given.
    pub email: String,
    /// Contact phone, stored as given.
    pub phone: String,
    /// Owner classification.
    pub owner_type: OwnerType,
    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,
    /// Who made the assignment, if known.
    pub assigned_by: Option<String>,
}

impl OwnerData {
    /// Create owner data stamped with the current time.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        owner_type: OwnerType,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            owner_type,
            assigned_at: Utc::now(),
            assigned_by: None,
        }
    }

    /// Attribute the assignment to someone.
    #[must_use]
    pub fn assigned_by(mut self, who: impl Into<String>) -> Self {
        self.assigned_by = Some(who.into());
        self
    }

    /// Override the assignment timestamp.
    #[must_use]
    pub fn assigned_at(mut self, at: DateTime<Utc>) -> Self {
        self.assigned_at = at;
        self
    }
}

/// The owner attached to a unit. At most one exists per unit per project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRecord {
    /// The unit this owner is attached to.
    pub unit_id: String,
    /// Owner's full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Owner classification.
    pub owner_type: OwnerType,
    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,
    /// Who made the assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<String>,
}

impl OwnerRecord {
    /// Build a record for `unit_id` from caller-supplied data.
    #[must_use]
    pub fn from_data(unit_id: impl Into<String>, data: OwnerData) -> Self {
        Self {
            unit_id: unit_id.into(),
            name: data.name,
            email: data.email,
            phone: data.phone,
            owner_type: data.owner_type,
            assigned_at: data.assigned_at,
            assigned_by: data.assigned_by,
        }
    }
}

/// Parking spots held by a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingAssignment {
    /// The unit holding the spots.
    pub unit_id: String,
    /// Spot ids, unique within the list, in assignment order.
    pub parking_spot_ids: Vec<String>,
    /// When the list last changed.
    pub assigned_at: DateTime<Utc>,
}

impl ParkingAssignment {
    /// Create an assignment, dropping repeated spot ids.
    #[must_use]
    pub fn new<I, S>(unit_id: impl Into<String>, spots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parking_spot_ids: Vec<String> = Vec::new();
        for spot in spots {
            let spot = spot.into();
            if !parking_spot_ids.contains(&spot) {
                parking_spot_ids.push(spot);
            }
        }
        Self {
            unit_id: unit_id.into(),
            parking_spot_ids,
            assigned_at: Utc::now(),
        }
    }

    /// Check whether this assignment includes `spot_id`.
    #[must_use]
    pub fn contains(&self, spot_id: &str) -> bool {
        self.parking_spot_ids.iter().any(|s| s == spot_id)
    }

    /// Check if no spots are assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parking_spot_ids.is_empty()
    }
}
