//! REST API client for the subject discovery backend.
//!
//! [`ApiClient::request`] performs one call: it attaches the stored bearer
//! credential, sends through the configured [`Transport`], and classifies the
//! response. A 401 clears the stored credential right here and then runs the
//! unauthorized hook, if one is installed, so every call site gets the
//! invalidation for free. The endpoint helpers below are thin fixed-shape
//! wrappers over `request`.
//!
//! ERROR HANDLING
//! ==============
//! All [`ApiError`] kinds reach the caller. The only exception is the
//! profile/skills/stats reads, which degrade to placeholder values because
//! those resources do not exist yet for new accounts. `Unauthorized` is never
//! replaced by a placeholder.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::request::RequestDescriptor;
use super::response;
use super::transport::{BrowserTransport, Transport};
use super::types::{
    AiAnswer, AskRequest, Feedback, GenerateRequest, LoginRequest, Preferences, RecommendRequest,
    RegisterRequest, Subject, SubjectQuery, TokenResponse, User, UserProfile, UserSkill, UserStats,
};
use crate::config::ApiConfig;
use crate::state::storage::{self, ACCESS_TOKEN_KEY, BrowserStorage, KeyValueStore};

pub const DEFAULT_POPULAR_SUBJECTS_LIMIT: u32 = 10;
pub const DEFAULT_POPULAR_KEYWORDS_LIMIT: u32 = 20;

/// Callback run after a 401 has cleared the stored credential.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Shared handle for API calls. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn KeyValueStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { config, transport, storage, on_unauthorized: None }
    }

    /// A client sharing this one's transport and storage that runs `hook`
    /// after every 401.
    #[must_use]
    pub fn with_unauthorized_hook(&self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        Self { on_unauthorized: Some(Arc::new(hook)), ..self.clone() }
    }

    /// A client sharing this one's transport and storage with no 401 hook.
    #[must_use]
    pub fn without_unauthorized_hook(&self) -> Self {
        Self { on_unauthorized: None, ..self.clone() }
    }

    /// Client wired to `fetch` and `localStorage`, using the build-time base URL.
    pub fn browser() -> Self {
        Self::new(ApiConfig::from_env(), Arc::new(BrowserTransport), Arc::new(BrowserStorage))
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The credential store this client reads from.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.storage)
    }

    /// Perform one API call and return its JSON payload (`true` for 204).
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] on 401, after removing the stored credential
    ///   and running the unauthorized hook
    /// - [`ApiError::RequestFailed`] on any other non-2xx status
    /// - [`ApiError::Network`] when no response was received
    /// - [`ApiError::Json`] when the body cannot be encoded or decoded
    pub async fn request(&self, descriptor: &RequestDescriptor) -> Result<Value, ApiError> {
        let credential = storage::credential(self.storage.as_ref());
        let method = descriptor.method.as_str();
        let path = descriptor.path_and_query();
        log::debug!("api request: {method} {path} (credential: {})", credential.is_some());

        let http = descriptor.resolve(&self.config, credential.as_deref())?;
        let resp = match self.transport.send(http).await {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("api request failed: {method} {path}: {e}");
                return Err(e.into());
            }
        };
        log::debug!("api response: {method} {path} -> {} {}", resp.status, resp.status_text);

        match response::classify(&resp) {
            Err(ApiError::Unauthorized) => {
                log::info!("unauthorized response for {path}; clearing stored credential");
                self.storage.remove(ACCESS_TOKEN_KEY);
                if let Some(hook) = &self.on_unauthorized {
                    hook();
                }
                Err(ApiError::Unauthorized)
            }
            Err(e) => {
                log::warn!("api error: {method} {path}: {e}");
                Err(e)
            }
            ok => ok,
        }
    }

    /// [`Self::request`] followed by decoding into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request`], plus [`ApiError::Json`] if the payload does not match `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T, ApiError> {
        let value = self.request(descriptor).await?;
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// `POST /auth/login-json`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let req = RequestDescriptor::post("/auth/login-json").json(&LoginRequest { email, password })?;
        self.fetch(&req).await
    }

    /// `POST /auth/register`. Does not establish a session.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn register(&self, data: &RegisterRequest) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::post("/auth/register").json(data)?).await
    }

    /// `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.fetch(&RequestDescriptor::get("/auth/me")).await
    }

    /// `POST /auth/forgot-password`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn forgot_password(&self, email: &str) -> Result<Value, ApiError> {
        let req = RequestDescriptor::post("/auth/forgot-password").json(&serde_json::json!({ "email": email }))?;
        self.request(&req).await
    }

    /// `POST /auth/reset-password`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<Value, ApiError> {
        let req = RequestDescriptor::post("/auth/reset-password")
            .json(&serde_json::json!({ "token": token, "new_password": new_password }))?;
        self.request(&req).await
    }

    // =========================================================================
    // SUBJECTS
    // =========================================================================

    /// `GET /sujets` with the set filters.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn list_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>, ApiError> {
        self.fetch(&subjects_request(query)).await
    }

    /// `GET /sujets/{id}`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn get_subject(&self, id: i64) -> Result<Subject, ApiError> {
        self.fetch(&RequestDescriptor::get(format!("/sujets/{id}"))).await
    }

    /// `POST /sujets/recommend`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn recommend_subjects(&self, data: &RecommendRequest) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::post("/sujets/recommend").json(data)?).await
    }

    /// `POST /sujets/feedback`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn submit_feedback(&self, feedback: &Feedback) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::post("/sujets/feedback").json(feedback)?).await
    }

    /// `GET /sujets/stats/popular`, defaulting to 10 entries.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn popular_subjects(&self, limit: Option<u32>) -> Result<Value, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_POPULAR_SUBJECTS_LIMIT);
        self.request(&RequestDescriptor::get("/sujets/stats/popular").query("limit", limit)).await
    }

    /// `GET /sujets/stats/keywords`, defaulting to 20 entries.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn popular_keywords(&self, limit: Option<u32>) -> Result<Value, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_POPULAR_KEYWORDS_LIMIT);
        self.request(&RequestDescriptor::get("/sujets/stats/keywords").query("limit", limit)).await
    }

    /// `GET /sujets/stats/domains`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn domain_stats(&self) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::get("/sujets/stats/domains")).await
    }

    // =========================================================================
    // AI
    // =========================================================================

    /// `POST /ai/ask`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn ask_ai(&self, question: &str, context: Option<&Value>) -> Result<AiAnswer, ApiError> {
        let req = RequestDescriptor::post("/ai/ask").json(&AskRequest { question, context })?;
        self.fetch(&req).await
    }

    /// `POST /ai/generate`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn generate_subjects(&self, data: &GenerateRequest) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::post("/ai/generate").json(data)?).await
    }

    /// `POST /ai/analyze`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn analyze_subject(&self, data: &Value) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::post("/ai/analyze").json(data)?).await
    }

    /// `GET /ai/criteria`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn acceptance_criteria(&self) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::get("/ai/criteria")).await
    }

    /// `GET /ai/tips`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn tips(&self) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::get("/ai/tips")).await
    }

    // =========================================================================
    // PREFERENCES
    // =========================================================================

    /// `GET /users/me/preferences`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn preferences(&self) -> Result<Preferences, ApiError> {
        self.fetch(&RequestDescriptor::get("/users/me/preferences")).await
    }

    /// `PUT /users/me/preferences`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn update_preferences(&self, data: &Preferences) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::put("/users/me/preferences").json(data)?).await
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// `GET /users/{id}/profile`, or an empty profile when none exists yet.
    ///
    /// # Errors
    ///
    /// Only [`ApiError::Unauthorized`].
    pub async fn user_profile(&self, user_id: i64) -> Result<UserProfile, ApiError> {
        let result = self.fetch(&RequestDescriptor::get(user_resource(user_id, "profile"))).await;
        or_placeholder(result, "profile", || UserProfile::placeholder(user_id))
    }

    /// `GET /users/{id}/skills`, or an empty list.
    ///
    /// # Errors
    ///
    /// Only [`ApiError::Unauthorized`].
    pub async fn user_skills(&self, user_id: i64) -> Result<Vec<UserSkill>, ApiError> {
        let result = self.fetch(&RequestDescriptor::get(user_resource(user_id, "skills"))).await;
        or_placeholder(result, "skills", Vec::new)
    }

    /// `GET /users/{id}/stats`, or zeroed counters.
    ///
    /// # Errors
    ///
    /// Only [`ApiError::Unauthorized`].
    pub async fn user_stats(&self, user_id: i64) -> Result<UserStats, ApiError> {
        let result = self.fetch(&RequestDescriptor::get(user_resource(user_id, "stats"))).await;
        or_placeholder(result, "stats", UserStats::default)
    }

    /// `PUT /users/{id}/profile`. When the backend has no profile endpoint yet,
    /// the submitted profile is echoed back so the form keeps its values.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`], or [`ApiError::Json`] if `profile` fails to serialize.
    pub async fn update_user_profile(&self, user_id: i64, profile: &UserProfile) -> Result<UserProfile, ApiError> {
        let req = RequestDescriptor::put(user_resource(user_id, "profile")).json(profile)?;
        let result = self.fetch(&req).await;
        or_placeholder(result, "profile update", || UserProfile { user_id, ..profile.clone() })
    }

    /// `PUT /users/{id}/skills`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn update_user_skills(&self, user_id: i64, skills: &[UserSkill]) -> Result<Value, ApiError> {
        let req = RequestDescriptor::put(user_resource(user_id, "skills")).json(&serde_json::json!({ "skills": skills }))?;
        self.request(&req).await
    }

    // =========================================================================
    // UTILITIES
    // =========================================================================

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn health_check(&self) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::get("/health")).await
    }

    /// `GET /config`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] from the call.
    pub async fn server_config(&self) -> Result<Value, ApiError> {
        self.request(&RequestDescriptor::get("/config")).await
    }

    /// Whether the backend answers its health probe.
    pub async fn test_backend_connection(&self) -> bool {
        match self.health_check().await {
            Ok(_) => true,
            Err(e) => {
                log::error!("backend not reachable: {e}");
                false
            }
        }
    }
}

fn subjects_request(query: &SubjectQuery) -> RequestDescriptor {
    RequestDescriptor::get("/sujets")
        .query_opt("skip", query.skip)
        .query_opt("limit", query.limit)
        .query_opt("search", query.search.as_deref())
        .query_opt("domaine", query.domaine.as_deref())
        .query_opt("faculté", query.faculte.as_deref())
        .query_opt("niveau", query.niveau.as_deref())
        .query_opt("difficulté", query.difficulte.as_deref())
}

fn user_resource(user_id: i64, resource: &str) -> String {
    format!("/users/{user_id}/{resource}")
}

fn or_placeholder<T>(
    result: Result<T, ApiError>,
    what: &str,
    placeholder: impl FnOnce() -> T,
) -> Result<T, ApiError> {
    match result {
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
        Err(e) => {
            log::info!("{what} unavailable ({e}); using placeholder");
            Ok(placeholder())
        }
        ok => ok,
    }
}
