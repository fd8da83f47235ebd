//! Patient profile: body measurements and clinical context for one user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile fields as submitted by a client
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileInput {
    /// Patient the profile belongs to
    pub user_id: String,
    #[serde(default)]
    pub age: Option<u32>,
    /// Height in centimetres
    #[serde(default)]
    pub height: Option<f64>,
    /// Weight in kilograms
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub injury_info: Option<String>,
    /// Assigned physiotherapist
    #[serde(default)]
    pub physio_id: Option<String>,
}

/// Stored patient profile, one per user (later saves replace earlier ones)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientProfile {
    pub user_id: String,
    pub age: Option<u32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub injury_info: Option<String>,
    pub physio_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PatientProfile {
    pub fn from_input(input: ProfileInput, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id: input.user_id,
            age: input.age,
            height: input.height,
            weight: input.weight,
            injury_info: input.injury_info,
            physio_id: input.physio_id,
            updated_at,
        }
    }
}
