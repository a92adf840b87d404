//! Minimal client for the koi consultation backend.
//!
//! This crate provides a focused client for the platform's REST API with:
//! - Destiny catalog and relation lookups
//! - Year-based auto-consultation
//! - Paged animal-category search by destiny
//!
//! Every response travels in an envelope `{code, result, message}` where
//! `code == 1000` signals success; any other code is surfaced as an
//! application-level error carrying the backend message.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Envelope code the backend uses for success.
const SUCCESS_CODE: i64 = 1000;

/// Environment variable holding the bearer token, if any.
const TOKEN_ENV: &str = "KOI_API_TOKEN";

/// Errors that can occur when talking to the backend.
///
/// All payload carried by the variants is owned text, so the error is
/// `Clone` and can be fanned out to several waiting callers.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// Backend envelope carried a non-success code. The message is the
    /// backend-supplied one when present, else a generic fallback.
    #[error("{message}")]
    Api { code: i64, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Consultation backend client.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl Client {
    /// Create a new client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Create a client, picking up a bearer token from `KOI_API_TOKEN`
    /// when the variable is set.
    ///
    /// A missing token is not an error here: unauthenticated requests are
    /// allowed to proceed and the backend rejects them with an ordinary
    /// failure envelope.
    pub fn from_env(base_url: impl Into<String>) -> Self {
        let mut client = Self::new(base_url);
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            client.token = Some(token);
        }
        client
    }

    /// Set the bearer token attached to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// List all destiny elements known to the backend.
    pub async fn list_destinies(&self) -> Result<Vec<DestinyRef>, Error> {
        let raw: Vec<ApiDestinyRef> = self.get("/destinys").await?;
        Ok(raw
            .into_iter()
            .map(|d| DestinyRef {
                id: d.id,
                name: d.destiny,
            })
            .collect())
    }

    /// Fetch the mutual-generation and mutual-overcoming element names for
    /// one destiny.
    pub async fn destiny_relations(&self, name: &str) -> Result<DestinyRelations, Error> {
        let raw: ApiDestinyDetail = self.get(&format!("/destinys/{name}")).await?;
        Ok(DestinyRelations {
            generation: raw.destiny_tuong_sinhs.into_iter().map(|r| r.name).collect(),
            overcoming: raw.destiny_tuong_khacs.into_iter().map(|r| r.name).collect(),
        })
    }

    /// Fetch the auto-consultation payload for a birth year.
    ///
    /// The wire payload is normalized here: both relation entries must be
    /// present (a consultation with only one side is malformed) and missing
    /// optional attribute arrays inside an entry coerce to empty vectors.
    pub async fn consultation_by_year(&self, year: i32) -> Result<ConsultationPayload, Error> {
        let raw: ApiConsultation = self.get(&format!("/consultation-by-year?year={year}")).await?;
        normalize_consultation(raw)
    }

    /// Search animal categories compatible with the given destiny names.
    pub async fn animals_by_destiny(
        &self,
        destinies: &[&str],
        page: u32,
        size: u32,
    ) -> Result<Page<AnimalCategory>, Error> {
        let destiny = destinies.join(",");
        let raw: ApiPage<ApiAnimalCategory> = self
            .get(&format!(
                "/animals/animal-destiny?destiny={destiny}&page={page}&size={size}"
            ))
            .await?;
        Ok(Page {
            data: raw.data.into_iter().map(AnimalCategory::from).collect(),
            total_pages: raw.total_pages,
            total_elements: raw.total_elements,
        })
    }

    async fn get<T: DeserializeOwned + Default>(&self, path_and_query: &str) -> Result<T, Error> {
        let headers = self.build_headers()?;

        let response = self
            .http
            .get(format!("{}{path_and_query}", self.base_url))
            .headers(headers)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http {
                status,
                message: body,
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        unwrap_envelope(envelope)
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| Error::Config(format!("Invalid token: {e}")))?,
            );
        }
        Ok(headers)
    }
}

/// Unwrap the backend envelope, turning non-success codes into errors.
fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, Error> {
    if envelope.code != SUCCESS_CODE {
        return Err(Error::Api {
            code: envelope.code,
            message: envelope
                .message
                .unwrap_or_else(|| format!("Backend reported failure code {}", envelope.code)),
        });
    }
    envelope
        .result
        .ok_or_else(|| Error::Parse("success envelope without a result".to_string()))
}

fn normalize_consultation(raw: ApiConsultation) -> Result<ConsultationPayload, Error> {
    let own = raw
        .consultation2
        .ok_or_else(|| Error::Parse("consultation payload missing the target-element entry".to_string()))?;
    let generation = raw
        .consultation1
        .ok_or_else(|| Error::Parse("consultation payload missing the generating-element entry".to_string()))?;

    Ok(ConsultationPayload {
        destiny: raw.destiny,
        generating: raw.destiny_tuong_sinh,
        generation: generation.into(),
        own: own.into(),
    })
}

// ============================================================================
// Public types
// ============================================================================

/// A destiny element as listed by the backend catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinyRef {
    pub id: i64,
    pub name: String,
}

/// Element-name lists for one destiny: which elements generate it and which
/// it stands in the overcoming relation with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinyRelations {
    pub generation: Vec<String>,
    pub overcoming: Vec<String>,
}

/// Normalized auto-consultation payload for one birth year.
///
/// `own` carries the attributes of the target destiny itself and
/// `generation` the attributes of the element that generates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationPayload {
    pub destiny: String,
    /// Name of the element that generates the target destiny.
    pub generating: String,
    pub generation: RelationEntry,
    pub own: RelationEntry,
}

/// Attributes attached to one element in one relation direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationEntry {
    pub numbers: Vec<i64>,
    pub colors: Vec<String>,
    pub directions: Vec<String>,
    pub shapes: Vec<String>,
    pub animals: Vec<AnimalCategory>,
    pub shelters: Vec<ShelterCategory>,
}

/// An animal category referenced by a relation entry. Owned by the backend;
/// never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub images: Vec<ImageRef>,
}

/// A shelter (pond) category referenced by a relation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub length: Option<f64>,
    pub diameter: Option<f64>,
    pub water_volume: Option<f64>,
    pub filtration_system: Option<String>,
    pub images: Vec<ImageRef>,
}

/// A hosted image attached to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: i64,
    pub url: String,
}

/// One page of a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
}

// ============================================================================
// Internal wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiDestinyRef {
    id: i64,
    destiny: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDestinyDetail {
    #[serde(default)]
    destiny_tuong_sinhs: Vec<ApiRelatedName>,
    #[serde(default)]
    destiny_tuong_khacs: Vec<ApiRelatedName>,
}

#[derive(Debug, Deserialize)]
struct ApiRelatedName {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiConsultation {
    destiny: String,
    destiny_tuong_sinh: String,
    consultation1: Option<ApiRelationEntry>,
    consultation2: Option<ApiRelationEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiRelationEntry {
    #[serde(default)]
    numbers: Vec<i64>,
    #[serde(default)]
    colors: Vec<String>,
    #[serde(default)]
    directions: Vec<String>,
    #[serde(default)]
    shapes: Vec<String>,
    #[serde(default)]
    animals: Vec<ApiAnimalCategory>,
    #[serde(default)]
    shelters: Vec<ApiShelterCategory>,
}

impl From<ApiRelationEntry> for RelationEntry {
    fn from(raw: ApiRelationEntry) -> Self {
        Self {
            numbers: raw.numbers,
            colors: raw.colors,
            directions: raw.directions,
            shapes: raw.shapes,
            animals: raw.animals.into_iter().map(AnimalCategory::from).collect(),
            shelters: raw.shelters.into_iter().map(ShelterCategory::from).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAnimalCategory {
    id: i64,
    animal_category_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    animal_images: Vec<ApiImage>,
}

impl From<ApiAnimalCategory> for AnimalCategory {
    fn from(raw: ApiAnimalCategory) -> Self {
        Self {
            id: raw.id,
            name: raw.animal_category_name,
            description: raw.description,
            origin: raw.origin,
            images: raw.animal_images.into_iter().map(ImageRef::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiShelterCategory {
    id: i64,
    shelter_category_name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    diameter: Option<f64>,
    #[serde(default)]
    water_volume: Option<f64>,
    #[serde(default)]
    water_filtration_system: Option<String>,
    #[serde(default)]
    shelter_images: Vec<ApiImage>,
}

impl From<ApiShelterCategory> for ShelterCategory {
    fn from(raw: ApiShelterCategory) -> Self {
        Self {
            id: raw.id,
            name: raw.shelter_category_name,
            description: raw.description,
            width: raw.width,
            height: raw.height,
            length: raw.length,
            diameter: raw.diameter,
            water_volume: raw.water_volume,
            filtration_system: raw.water_filtration_system,
            images: raw.shelter_images.into_iter().map(ImageRef::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiImage {
    id: i64,
    image_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPage<T> {
    #[serde(default)]
    data: Vec<T>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_elements: u64,
}

impl From<ApiImage> for ImageRef {
    fn from(raw: ApiImage) -> Self {
        Self {
            id: raw.id,
            url: raw.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: DeserializeOwned + Default>(body: &str) -> Result<T, Error> {
        let envelope: Envelope<T> =
            serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;
        unwrap_envelope(envelope)
    }

    #[test]
    fn test_client_builder() {
        let client = Client::new("https://api.example.com/").with_token("secret");
        assert_eq!(client.base_url, "https://api.example.com");
        assert_eq!(client.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_destiny_list_envelope() {
        let body = r#"{
            "code": 1000,
            "result": [
                {"id": 1, "destiny": "Wood"},
                {"id": 2, "destiny": "Fire"}
            ]
        }"#;
        let raw: Vec<ApiDestinyRef> = parse(body).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1].destiny, "Fire");
    }

    #[test]
    fn test_destiny_detail_envelope() {
        let body = r#"{
            "code": 1000,
            "result": {
                "destinyTuongSinhs": [{"name": "Water"}],
                "destinyTuongKhacs": [{"name": "Earth"}, {"name": "Metal"}]
            }
        }"#;
        let raw: ApiDestinyDetail = parse(body).unwrap();
        assert_eq!(raw.destiny_tuong_sinhs[0].name, "Water");
        assert_eq!(raw.destiny_tuong_khacs.len(), 2);
    }

    #[test]
    fn test_failure_envelope_carries_backend_message() {
        let body = r#"{"code": 2000, "message": "not found"}"#;
        let err = parse::<ApiDestinyDetail>(body).unwrap_err();
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, 2000);
                assert_eq!(message, "not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_envelope_without_message_gets_fallback() {
        let body = r#"{"code": 4042}"#;
        let err = parse::<ApiDestinyDetail>(body).unwrap_err();
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, 4042);
                assert!(message.contains("4042"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_consultation_payload_full() {
        let body = r#"{
            "code": 1000,
            "result": {
                "destiny": "Earth",
                "destinyTuongSinh": "Fire",
                "consultation1": {
                    "numbers": [2, 7],
                    "colors": ["Red", "Orange"],
                    "directions": ["South"],
                    "shapes": ["Triangle"],
                    "animals": [{
                        "id": 5,
                        "animalCategoryName": "Kohaku",
                        "description": "White base with red markings",
                        "origin": "Japan",
                        "animalImages": [{"id": 9, "imageUrl": "https://img/kohaku.jpg"}]
                    }],
                    "shelters": []
                },
                "consultation2": {
                    "numbers": [5, 10],
                    "colors": ["Yellow", "Brown"],
                    "directions": ["Northeast", "Southwest"],
                    "shapes": ["Square"],
                    "animals": [],
                    "shelters": [{
                        "id": 3,
                        "shelterCategoryName": "Stone pond",
                        "waterVolume": 1200.5
                    }]
                }
            }
        }"#;
        let raw: ApiConsultation = parse(body).unwrap();
        let payload = normalize_consultation(raw).unwrap();

        assert_eq!(payload.destiny, "Earth");
        assert_eq!(payload.generating, "Fire");
        assert_eq!(payload.generation.numbers, vec![2, 7]);
        assert_eq!(payload.own.colors, vec!["Yellow", "Brown"]);
        assert_eq!(payload.generation.animals[0].name, "Kohaku");
        assert_eq!(payload.generation.animals[0].images[0].url, "https://img/kohaku.jpg");
        assert_eq!(payload.own.shelters[0].water_volume, Some(1200.5));
        assert!(payload.own.shelters[0].description.is_none());
    }

    #[test]
    fn test_missing_attribute_arrays_coerce_to_empty() {
        let body = r#"{
            "code": 1000,
            "result": {
                "destiny": "Water",
                "destinyTuongSinh": "Metal",
                "consultation1": {"numbers": [1, 6]},
                "consultation2": {"colors": ["Black", "Blue"]}
            }
        }"#;
        let raw: ApiConsultation = parse(body).unwrap();
        let payload = normalize_consultation(raw).unwrap();

        assert_eq!(payload.generation.numbers, vec![1, 6]);
        assert!(payload.generation.colors.is_empty());
        assert!(payload.generation.animals.is_empty());
        assert_eq!(payload.own.colors, vec!["Black", "Blue"]);
        assert!(payload.own.shelters.is_empty());
    }

    #[test]
    fn test_consultation_missing_entry_is_a_parse_error() {
        let body = r#"{
            "code": 1000,
            "result": {
                "destiny": "Wood",
                "destinyTuongSinh": "Water",
                "consultation2": {"numbers": [3, 8]}
            }
        }"#;
        let raw: ApiConsultation = parse(body).unwrap();
        let err = normalize_consultation(raw).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_paged_animal_search_envelope() {
        let body = r#"{
            "code": 1000,
            "result": {
                "data": [{"id": 1, "animalCategoryName": "Showa"}],
                "totalPages": 4,
                "totalElements": 37
            }
        }"#;
        let raw: ApiPage<ApiAnimalCategory> = parse(body).unwrap();
        assert_eq!(raw.total_pages, 4);
        assert_eq!(raw.total_elements, 37);
        assert_eq!(raw.data[0].animal_category_name, "Showa");
    }
}
