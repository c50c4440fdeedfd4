//! Shared wire-protocol DTOs for the client/API boundary.
//!
//! DESIGN
//! ======
//! Field names follow the backend's JSON (French domain terms included) so
//! serde round-trips stay lossless. Records the client only displays keep an
//! `extra` map so fields added server-side are not dropped.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// AUTH
// =============================================================================

/// Account role. The backend uses French role names; English aliases are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "etudiant", alias = "student")]
    Student,
    #[serde(rename = "enseignant", alias = "teacher")]
    Teacher,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    /// Display label used by the dashboard chrome.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Étudiant",
            Self::Teacher => "Enseignant",
            Self::Admin => "Administrateur",
        }
    }
}

/// An authenticated user as returned by the `/auth/me` endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    /// ISO 8601 creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Extended profile fields the client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Name to show in the UI, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Credentials posted to `/auth/login-json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Token payload returned by a successful login.
///
/// The token is optional on the wire so a malformed answer can be reported
/// as an invalid credential response instead of a decode error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// The access token, if present and non-empty.
    #[must_use]
    pub fn usable_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Account creation payload for `/auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
}

// =============================================================================
// SUBJECTS
// =============================================================================

/// A thesis subject listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub titre: String,
    #[serde(default)]
    pub domaine: Option<String>,
    #[serde(default, rename = "faculté")]
    pub faculte: Option<String>,
    #[serde(default)]
    pub niveau: Option<String>,
    #[serde(default, rename = "difficulté")]
    pub difficulte: Option<String>,
    #[serde(default, rename = "problématique")]
    pub problematique: Option<String>,
    /// Comma-separated keyword list.
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub vue_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subject {
    /// Split the comma-separated keyword list.
    #[must_use]
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .map(|raw| raw.split(',').map(str::trim).filter(|k| !k.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Filters for `GET /sujets`. Unset filters are omitted from the query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubjectQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub domaine: Option<String>,
    pub faculte: Option<String>,
    pub niveau: Option<String>,
    pub difficulte: Option<String>,
}

/// Body for `POST /sujets/recommend`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niveau: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculte: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Body for `POST /sujets/feedback`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub sujet_id: i64,
    #[serde(rename = "intéressé")]
    pub interesse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
}

// =============================================================================
// AI
// =============================================================================

/// Body for `POST /ai/ask`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AskRequest<'a> {
    pub question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a Value>,
}

/// Answer from `POST /ai/ask`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AiAnswer {
    #[serde(default, rename = "réponse")]
    pub reponse: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AiAnswer {
    /// The answer text, whichever field the server filled.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.reponse.as_deref().or(self.message.as_deref())
    }
}

/// Body for `POST /ai/generate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub interests: Vec<String>,
    pub count: u32,
}

// =============================================================================
// USERS
// =============================================================================

/// Stored subject-search preferences (`/users/me/preferences`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

/// Extended profile for a user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_id: i64,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub interests: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserProfile {
    /// Empty profile shown before the user has saved one.
    #[must_use]
    pub fn placeholder(user_id: i64) -> Self {
        Self { user_id, ..Self::default() }
    }
}

/// One declared skill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSkill {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub name: String,
    /// Self-assessed level.
    pub level: u8,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Activity counters for the profile dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub profile_completion: u32,
    #[serde(default)]
    pub explored_subjects: u32,
    #[serde(default)]
    pub recommendations_count: u32,
    #[serde(default)]
    pub active_days: u32,
    #[serde(default)]
    pub last_active: Option<String>,
}
