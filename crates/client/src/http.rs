//! HTTP client for the accounting API.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use ledgerdesk_core::{AccountId, CompanyId};

use crate::config::ClientConfig;
use crate::dto::{
    Account, CreateInvoice, CreateLedgerEntry, InvoiceRecord, LoginRequest, LoginResponse,
    PostedEntry, SaveAccount, UserProfile,
};
use crate::error::{ApiError, server_message};
use crate::session::Session;

/// Typed client over the REST API.
///
/// Auth comes from the [`Session`] passed in; a 401 clears it and runs the
/// session's hook. Cloning is cheap and clones share the session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    company_id: Option<CompanyId>,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        if let Some(token) = &config.token {
            if !session.is_authenticated() {
                session.set_token(token.clone());
            }
        }

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            company_id: config.company_id.clone(),
            session,
        })
    }

    /// Scope listings to `company_id`.
    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn company_id(&self) -> Option<&CompanyId> {
        self.company_id.as_ref()
    }

    /// Log in and store the returned token in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self.send(Method::POST, "/auth/login", &[], Some(&body)).await?;
        self.session.set_token(resp.access_token.clone());
        tracing::info!("logged in");
        Ok(resp)
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.send::<(), _>(Method::GET, "/auth/profile", &[], None).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        let query = self.company_query();
        self.send::<(), _>(Method::GET, "/accounts", &query, None).await
    }

    pub async fn create_account(&self, payload: &SaveAccount) -> Result<Account, ApiError> {
        self.send(Method::POST, "/accounts", &[], Some(payload)).await
    }

    pub async fn update_account(&self, id: &AccountId, payload: &SaveAccount) -> Result<Account, ApiError> {
        let path = format!("/accounts/{id}");
        self.send(Method::PATCH, &path, &[], Some(payload)).await
    }

    /// Delete an account. Whatever the server returns on success is ignored.
    pub async fn delete_account(&self, id: &AccountId) -> Result<(), ApiError> {
        let path = format!("/accounts/{id}");
        self.send_raw::<()>(Method::DELETE, &path, &[], None).await?;
        tracing::info!(account_id = %id, "account deleted");
        Ok(())
    }

    pub async fn list_journal_entries(&self) -> Result<Vec<PostedEntry>, ApiError> {
        let query = self.company_query();
        self.send::<(), _>(Method::GET, "/journal", &query, None).await
    }

    pub async fn create_journal_entry(
        &self,
        payload: &CreateLedgerEntry,
    ) -> Result<PostedEntry, ApiError> {
        self.send(Method::POST, "/journal", &[], Some(payload)).await
    }

    pub async fn create_invoice(&self, payload: &CreateInvoice) -> Result<InvoiceRecord, ApiError> {
        self.send(Method::POST, "/invoices", &[], Some(payload)).await
    }

    // --- Internal helpers ---

    fn company_query(&self) -> Vec<(&'static str, String)> {
        self.company_id
            .iter()
            .map(|c| ("companyId", c.to_string()))
            .collect()
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.send_raw(method, path, query, body).await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Perform the request and return the body of a 2xx response.
    async fn send_raw<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<Vec<u8>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = resp.status();
        tracing::debug!(%method, path, status = status.as_u16(), "response");

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED {
            self.session.expire();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            let message = server_message(&text);
            tracing::warn!(%method, path, status = status.as_u16(), ?message, "API rejected request");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(bytes.to_vec())
    }
}
