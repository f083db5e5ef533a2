use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Roaster, RoasterChanges};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoasterRequest {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub address_city: String,
    #[serde(default)]
    pub address_state: String,
    #[serde(default)]
    pub address_zip: String,
    #[serde(default)]
    pub address_country: String,
}

impl NewRoasterRequest {
    pub fn into_roaster(self, id: Uuid) -> Roaster {
        Roaster {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            address_city: self.address_city,
            address_state: self.address_state,
            address_zip: self.address_zip,
            address_country: self.address_country,
        }
    }
}

/// Partial update. The id always comes from the path, never the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoasterRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_country: Option<String>,
}

impl From<&UpdateRoasterRequest> for RoasterChanges {
    fn from(r: &UpdateRoasterRequest) -> Self {
        Self {
            name: r.name.clone(),
            email: r.email.clone(),
            phone: r.phone.clone(),
            address_line1: r.address_line1.clone(),
            address_line2: r.address_line2.clone(),
            address_city: r.address_city.clone(),
            address_state: r.address_state.clone(),
            address_zip: r.address_zip.clone(),
            address_country: r.address_country.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatedRoaster {
    pub id: Uuid,
    #[serde(flatten)]
    pub changes: UpdateRoasterRequest,
}
