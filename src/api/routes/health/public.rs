//! Public types for the health and stats API
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chat::ChatStats;

#[derive(Serialize, Debug, PartialEq, Eq)]
pub enum HealthStatus {
    #[serde(rename = "healthy")]
    Healthy,
    #[serde(rename = "unhealthy")]
    Unhealthy,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub chatbot_initialized: bool,
    pub has_search: bool,
    pub model: Option<String>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: ChatStats,
    pub timestamp: DateTime<Utc>,
}
