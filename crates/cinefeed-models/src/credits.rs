use serde::{Deserialize, Serialize};
use crate::images::{image_url, ImageSize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditsResponse {
    pub id: i64,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

/// A credited performer. The same person can appear several times on one
/// title, so identity is `(id, credit_id)` rather than `id` alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub original_name: Option<String>,
    pub character: Option<String>,
    /// Display priority, lower first
    pub order: u32,
    pub profile_path: Option<String>,
    pub popularity: Option<f64>,
    pub known_for_department: Option<String>,
    pub adult: Option<bool>,
    pub gender: Option<u8>,
    pub credit_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: i64,
    pub name: String,
    pub original_name: Option<String>,
    pub job: String,
    pub department: String,
    pub profile_path: Option<String>,
    pub popularity: Option<f64>,
    pub known_for_department: Option<String>,
    pub adult: Option<bool>,
    pub gender: Option<u8>,
    pub credit_id: String,
}

impl CastMember {
    pub fn credit_key(&self) -> (i64, &str) {
        (self.id, self.credit_id.as_str())
    }

    pub fn profile_url(&self) -> Option<String> {
        image_url(self.profile_path.as_deref(), ImageSize::Profile)
    }
}

impl CrewMember {
    pub fn credit_key(&self) -> (i64, &str) {
        (self.id, self.credit_id.as_str())
    }

    pub fn profile_url(&self) -> Option<String> {
        image_url(self.profile_path.as_deref(), ImageSize::Profile)
    }
}

impl CreditsResponse {
    /// Directors, in source order
    pub fn directors(&self) -> impl Iterator<Item = &CrewMember> {
        self.crew.iter().filter(|c| c.job == "Director")
    }
}
