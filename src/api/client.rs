//! Blocking HTTP client for the compliance service.

use reqwest::blocking::multipart;
use reqwest::blocking::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config;
use crate::models::{
    ComplianceRule, Procedure, ProcedureFilter, ProcedurePatch, RuleDraft, RulePatch,
    StatsSnapshot,
};

use super::{ApiError, AuditRequest, AuditResponse, ComplianceApi, UploadResponse};

/// Client for a single compliance-service base URL.
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(config::HTTP_TIMEOUT)
            .connect_timeout(config::HTTP_CONNECT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_transport(&self, e: reqwest::Error) -> ApiError {
        if e.is_connect() {
            ApiError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Transport(e.to_string())
        }
    }

    fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            Err(ApiError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response.json().map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .map_err(|e| self.map_transport(e))?;
        let response = Self::check_status(response)?;
        let bytes = response
            .bytes()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .map_err(|e| self.map_transport(e))?;
        Self::decode(Self::check_status(response)?)
    }

    fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(|e| self.map_transport(e))?;
        Self::decode(Self::check_status(response)?)
    }

    /// POST/PUT where the response body is irrelevant; only the status counts.
    fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .map_err(|e| self.map_transport(e))?;
        Self::check_status(response)?;
        Ok(())
    }
}

impl ComplianceApi for HttpApiClient {
    fn fetch_stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.get_json("/stats")
    }

    fn filter_procedures(&self, filter: &ProcedureFilter) -> Result<Vec<Procedure>, ApiError> {
        self.post_json("/procedures/filter", filter)
    }

    fn audit(&self, request: &AuditRequest) -> Result<AuditResponse, ApiError> {
        self.post_json("/audit", request)
    }

    fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/upload_image/"))
            .multipart(form)
            .send()
            .map_err(|e| self.map_transport(e))?;
        let upload: UploadResponse = Self::decode(Self::check_status(response)?)?;
        Ok(upload.file_url)
    }

    fn download_image(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&format!("/download_image/{name}"))
    }

    fn preview_image(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&format!("/uploaded/{name}"))
    }

    fn list_rules(&self) -> Result<Vec<ComplianceRule>, ApiError> {
        self.get_json("/compliance-rules")
    }

    fn create_rule(&self, draft: &RuleDraft) -> Result<(), ApiError> {
        self.send_json(reqwest::Method::POST, "/compliance-rules", draft)
    }

    fn update_rule(&self, id: &str, patch: &RulePatch) -> Result<(), ApiError> {
        self.send_json(reqwest::Method::PUT, &format!("/compliance-rules/{id}"), patch)
    }

    fn create_procedure(&self, procedure: &Procedure) -> Result<(), ApiError> {
        self.send_json(reqwest::Method::POST, "/medical-procedures", procedure)
    }

    fn update_procedure(&self, id: &str, patch: &ProcedurePatch) -> Result<(), ApiError> {
        self.send_json(reqwest::Method::PUT, &format!("/medical-procedures/{id}"), patch)
    }
}
