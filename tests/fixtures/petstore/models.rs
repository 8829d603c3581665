use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum PetStatus {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "sold")]
    Sold,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub category: Option<Category>,
    #[serde(rename = "photoUrls")]
    pub photo_urls: Vec<String>,
    pub tags: Vec<Tag>,
    pub status: PetStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "petId")]
    pub pet_id: i64,
    pub quantity: i32,
    #[serde(rename = "shipDate")]
    pub ship_date: Option<DateTime<Utc>>,
    pub complete: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}
