//! Stateless HTTP request builder and response parser for the loan API.
//!
//! # Design
//! `LoanClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `LoanService` glues the two together over a `Transport`; the split keeps
//! request shaping deterministic and testable without a network.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, CONTENT_TYPE_JSON};
use crate::types::{
    Acknowledgement, BiometricEnrollment, ComplianceReport, ComplianceRequest, CreditAssessment,
    CreditAssessmentRequest, EsgReport, EsgTrackingRequest, LoanApplication,
    LoanRecommendationRequest, LoanRecommendations,
};

/// Backend endpoints reachable through `LoanClient`. All are JSON POSTs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    RecommendLoans,
    SubmitLoan,
    VerifyCompliance,
    EnrollBiometric,
    AssessCredit,
    TrackEsg,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::RecommendLoans,
        Endpoint::SubmitLoan,
        Endpoint::VerifyCompliance,
        Endpoint::EnrollBiometric,
        Endpoint::AssessCredit,
        Endpoint::TrackEsg,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::RecommendLoans => "/recommend-loans",
            Endpoint::SubmitLoan => "/submit-loan",
            Endpoint::VerifyCompliance => "/verify-compliance",
            Endpoint::EnrollBiometric => "/enroll-biometric",
            Endpoint::AssessCredit => "/assess-credit",
            Endpoint::TrackEsg => "/track-esg",
        }
    }
}

/// Stateless client for the micro-finance backend.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanClient {
    base_url: String,
}

impl LoanClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    pub fn build_recommend_loans(
        &self,
        input: &LoanRecommendationRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.post(Endpoint::RecommendLoans, input)
    }

    pub fn build_submit_loan(&self, input: &LoanApplication) -> Result<HttpRequest, ApiError> {
        self.post(Endpoint::SubmitLoan, input)
    }

    pub fn build_verify_compliance(
        &self,
        input: &ComplianceRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.post(Endpoint::VerifyCompliance, input)
    }

    pub fn build_enroll_biometric(
        &self,
        input: &BiometricEnrollment,
    ) -> Result<HttpRequest, ApiError> {
        self.post(Endpoint::EnrollBiometric, input)
    }

    pub fn build_assess_credit(
        &self,
        input: &CreditAssessmentRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.post(Endpoint::AssessCredit, input)
    }

    pub fn build_track_esg(&self, input: &EsgTrackingRequest) -> Result<HttpRequest, ApiError> {
        self.post(Endpoint::TrackEsg, input)
    }

    pub fn parse_recommend_loans(
        &self,
        response: HttpResponse,
    ) -> Result<LoanRecommendations, ApiError> {
        decode(response)
    }

    pub fn parse_submit_loan(&self, response: HttpResponse) -> Result<Acknowledgement, ApiError> {
        decode(response)
    }

    pub fn parse_verify_compliance(
        &self,
        response: HttpResponse,
    ) -> Result<ComplianceReport, ApiError> {
        decode(response)
    }

    pub fn parse_enroll_biometric(
        &self,
        response: HttpResponse,
    ) -> Result<Acknowledgement, ApiError> {
        decode(response)
    }

    pub fn parse_assess_credit(&self, response: HttpResponse) -> Result<CreditAssessment, ApiError> {
        decode(response)
    }

    pub fn parse_track_esg(&self, response: HttpResponse) -> Result<EsgReport, ApiError> {
        decode(response)
    }

    fn post<T: Serialize>(&self, endpoint: Endpoint, input: &T) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let (name, value) = CONTENT_TYPE_JSON;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.url(endpoint),
            headers: vec![(name.to_string(), value.to_string())],
            body: Some(body),
        })
    }
}

/// Reject non-2xx responses with the raw status and body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
