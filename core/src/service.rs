//! Async API surface used by the views: one call per backend endpoint.
//!
//! Each call builds its request with `LoanClient`, performs exactly one
//! round trip through the `Transport` and parses the result. Nothing is
//! retried, cached or coalesced; two identical calls issue two requests.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::client::LoanClient;
use crate::config::AppConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    Acknowledgement, BiometricEnrollment, ComplianceReport, ComplianceRequest, CreditAssessment,
    CreditAssessmentRequest, EsgReport, EsgTrackingRequest, LoanApplication,
    LoanRecommendationRequest, LoanRecommendations, Risk, Score, SocialGraph, UserId,
};

#[derive(Debug, Clone)]
pub struct LoanService<T = HttpTransport> {
    client: LoanClient,
    transport: T,
}

impl LoanService<HttpTransport> {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_transport(LoanClient::new(&config.api_url), HttpTransport::new())
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(&AppConfig::from_env()?))
    }
}

impl<T: Transport> LoanService<T> {
    pub fn with_transport(client: LoanClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &LoanClient {
        &self.client
    }

    pub async fn get_recommendations(
        &self,
        user_id: impl Into<UserId>,
        score: impl Into<Score>,
        risk: impl Into<Risk>,
    ) -> Result<LoanRecommendations, ApiError> {
        let input = LoanRecommendationRequest {
            user_id: user_id.into(),
            score: score.into(),
            risk: risk.into(),
        };
        let request = self.client.build_recommend_loans(&input)?;
        self.client.parse_recommend_loans(self.round_trip(request).await?)
    }

    pub async fn submit_loan_application(
        &self,
        application: &LoanApplication,
    ) -> Result<Acknowledgement, ApiError> {
        let request = self.client.build_submit_loan(application)?;
        self.client.parse_submit_loan(self.round_trip(request).await?)
    }

    pub async fn verify_compliance(
        &self,
        user_data: Value,
        document_text: impl Into<String>,
        transaction_data: Vec<f64>,
        bio_data: Option<Vec<f64>>,
    ) -> Result<ComplianceReport, ApiError> {
        let input = ComplianceRequest {
            user_data,
            document_text: document_text.into(),
            transaction_data,
            bio_data,
        };
        let request = self.client.build_verify_compliance(&input)?;
        self.client.parse_verify_compliance(self.round_trip(request).await?)
    }

    pub async fn enroll_biometric(
        &self,
        user_id: impl Into<UserId>,
        bio_data: Vec<f64>,
    ) -> Result<Acknowledgement, ApiError> {
        let input = BiometricEnrollment {
            user_id: user_id.into(),
            bio_data,
        };
        let request = self.client.build_enroll_biometric(&input)?;
        self.client.parse_enroll_biometric(self.round_trip(request).await?)
    }

    pub async fn assess_creditworthiness(
        &self,
        data: Vec<f64>,
        social_data: Option<SocialGraph>,
    ) -> Result<CreditAssessment, ApiError> {
        let input = CreditAssessmentRequest { data, social_data };
        let request = self.client.build_assess_credit(&input)?;
        self.client.parse_assess_credit(self.round_trip(request).await?)
    }

    pub async fn track_esg(
        &self,
        source_data: BTreeMap<String, Vec<f64>>,
        factors: Vec<f64>,
        impact_data: Vec<f64>,
        risk: Option<Risk>,
    ) -> Result<EsgReport, ApiError> {
        let input = EsgTrackingRequest {
            source_data,
            factors,
            impact_data,
            risk,
        };
        let request = self.client.build_track_esg(&input)?;
        self.client.parse_track_esg(self.round_trip(request).await?)
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.path.clone();
        tracing::debug!(%method, %url, "sending request");

        let response = self.transport.execute(request).await.inspect_err(|err| {
            tracing::warn!(%method, %url, error = %err, "request failed");
        })?;

        if response.is_success() {
            tracing::debug!(%method, %url, status = response.status, "response received");
        } else {
            tracing::warn!(%method, %url, status = response.status, "backend rejected request");
        }
        Ok(response)
    }
}
