use serde::{Deserialize, Serialize};

/// Headline numbers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRating {
    pub total_points: f64,
    pub max_possible_points: f64,
    /// `None` unless a previous total was supplied.
    pub weekly_change: Option<f64>,
}

/// The unobtained weapon with the highest estimated value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextWeapon {
    pub name: String,
    pub icon: Option<String>,
    pub weapon_type: String,
    pub weapon_bucket: String,
    pub description: String,
    pub source: String,
    pub points: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkDetail {
    pub name: String,
    /// Installed on at least one qualifying copy.
    pub obtained: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponDetail {
    pub weapon_name: String,
    pub icon: Option<String>,
    pub weapon_type: String,
    pub weapon_bucket: String,
    pub rank: u32,
    /// Contribution when obtained, estimated value otherwise.
    pub points: f64,
    pub perks: Vec<PerkDetail>,
    pub recommended_perks: Vec<String>,
    pub obtained: bool,
    /// Number of qualifying copies owned.
    pub copies: usize,
    pub description: String,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDetail {
    pub name: String,
    pub total_options: usize,
    pub obtained_count: usize,
    pub max_points: f64,
    pub current_points: f64,
    pub additional_count: usize,
    pub additional_points: f64,
}

/// Everything one rating run produces.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub inventory_rating: InventoryRating,
    #[serde(rename = "nextImportantGun")]
    pub next_important_weapon: Option<NextWeapon>,
    pub weapon_details: Vec<WeaponDetail>,
    pub bucket_details: Vec<BucketDetail>,
}

impl ScoreBreakdown {
    pub fn total_points(&self) -> f64 {
        self.inventory_rating.total_points
    }

    pub fn max_possible_points(&self) -> f64 {
        self.inventory_rating.max_possible_points
    }

    /// Fill in the weekly change against an earlier total.
    pub fn with_previous_total(mut self, previous_total: f64) -> Self {
        self.inventory_rating.weekly_change = Some(self.total_points() - previous_total);
        self
    }

    pub fn weapon(&self, name: &str) -> Option<&WeaponDetail> {
        self.weapon_details
            .iter()
            .find(|detail| detail.weapon_name == name)
    }

    pub fn bucket(&self, name: &str) -> Option<&BucketDetail> {
        self.bucket_details.iter().find(|detail| detail.name == name)
    }
}
