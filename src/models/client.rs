use serde::{Deserialize, Serialize};

/// Компания-клиент (организатор или спонсор событий).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub company_name: String,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default, rename = "_version")]
    pub version: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientInput {
    pub company_name: String,
    pub company_website: Option<String>,
    pub company_description: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Option<String>>,
    #[serde(rename = "_version", skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

impl ClientPatch {
    pub fn new(id: impl Into<String>) -> Self {
        ClientPatch {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn apply(self, client: &mut Client) {
        if let Some(v) = self.company_name {
            client.company_name = v;
        }
        if let Some(v) = self.company_website {
            client.company_website = v;
        }
        if let Some(v) = self.company_description {
            client.company_description = v;
        }
        if let Some(v) = self.logo {
            client.logo = v;
        }
    }
}

impl Client {
    pub fn from_input(id: String, input: CreateClientInput) -> Self {
        Client {
            id,
            company_name: input.company_name,
            company_website: input.company_website,
            company_description: input.company_description,
            logo: input.logo,
            version: Some(1),
        }
    }

    pub fn summary(&self) -> ClientSummary {
        ClientSummary {
            id: self.id.clone(),
            company_name: Some(self.company_name.clone()),
            logo: self.logo.clone(),
        }
    }
}
