use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityType {
    IndoorTrack,
    OutdoorTrack,
    CrossCountryCourse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub facility_type: Option<FacilityType>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub logos: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "_version")]
    pub version: Option<i64>,
}

/// Поля объекта, которые приходят вместе с событием.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitySummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub logos: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub facility_type: Option<FacilityType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityInput {
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub facility_type: Option<FacilityType>,
    pub description: Option<String>,
    pub time_zone: String,
    pub logos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityPatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<Option<FacilityType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logos: Option<Vec<String>>,
    #[serde(rename = "_version", skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

impl FacilityPatch {
    pub fn new(id: impl Into<String>) -> Self {
        FacilityPatch {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn replace_with(id: impl Into<String>, input: CreateFacilityInput) -> Self {
        FacilityPatch {
            id: id.into(),
            name: Some(input.name),
            address: Some(input.address),
            city: Some(input.city),
            state: Some(input.state),
            zipcode: Some(input.zipcode),
            latitude: Some(input.latitude),
            longitude: Some(input.longitude),
            facility_type: Some(input.facility_type),
            description: Some(input.description),
            time_zone: Some(input.time_zone),
            logos: Some(input.logos),
            expected_version: None,
        }
    }

    pub fn apply(self, facility: &mut Facility) {
        if let Some(v) = self.name {
            facility.name = v;
        }
        if let Some(v) = self.address {
            facility.address = v;
        }
        if let Some(v) = self.city {
            facility.city = v;
        }
        if let Some(v) = self.state {
            facility.state = v;
        }
        if let Some(v) = self.zipcode {
            facility.zipcode = v;
        }
        if let Some(v) = self.latitude {
            facility.latitude = v;
        }
        if let Some(v) = self.longitude {
            facility.longitude = v;
        }
        if let Some(v) = self.facility_type {
            facility.facility_type = v;
        }
        if let Some(v) = self.description {
            facility.description = v;
        }
        if let Some(v) = self.time_zone {
            facility.time_zone = Some(v);
        }
        if let Some(v) = self.logos {
            facility.logos = v;
        }
    }
}

impl Facility {
    pub fn from_input(id: String, input: CreateFacilityInput) -> Self {
        Facility {
            id,
            name: input.name,
            time_zone: Some(input.time_zone),
            address: input.address,
            city: input.city,
            state: input.state,
            zipcode: input.zipcode,
            latitude: input.latitude,
            longitude: input.longitude,
            facility_type: input.facility_type,
            logos: input.logos,
            description: input.description,
            version: Some(1),
        }
    }

    pub fn summary(&self) -> FacilitySummary {
        FacilitySummary {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            time_zone: self.time_zone.clone(),
            logos: self.logos.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            facility_type: self.facility_type,
        }
    }
}
