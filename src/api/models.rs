use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize optional string, treating empty strings as None
fn deserialize_optional_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(s.to_string())),
    }
}

/// Full-text search parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Combined filter parameters; `page` stays raw so a malformed value can be reported
#[derive(Debug, Clone, Deserialize)]
pub struct DoubleFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub flavor_profile: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub meat_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

/// Video metadata for a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoData {
    pub video_id: String,
    pub video_url: Option<String>,
    pub video_title: Option<String>,
    pub video_metadata: serde_json::Value,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
