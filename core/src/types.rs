//! Request and response records for the micro-finance backend.
//!
//! # Design
//! One struct per endpoint and direction. Field names are the wire names, so
//! the local-to-wire mapping (`user_id`, `document_text`, ...) is fixed by
//! the type rather than by convention at each call site. Optional request
//! fields serialize as `null` when absent; the backend reads them with a
//! default and the client never drops them.
//!
//! Values are passed through as the caller supplied them. Nothing here
//! validates ranges or normalizes text.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user identifier. Views send either a numeric account index or a text
/// handle; both go on the wire unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(u64),
    Text(String),
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId::Numeric(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::Text(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        UserId::Text(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Numeric(id) => write!(f, "{id}"),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

/// A number exactly as the caller wrote it. `700` stays an integer on the
/// wire and `0.5` stays a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Integer(i64),
    Decimal(f64),
}

impl Score {
    pub fn as_f64(self) -> f64 {
        match self {
            Score::Integer(n) => n as f64,
            Score::Decimal(n) => n,
        }
    }
}

impl From<i32> for Score {
    fn from(n: i32) -> Self {
        Score::Integer(n.into())
    }
}

impl From<i64> for Score {
    fn from(n: i64) -> Self {
        Score::Integer(n)
    }
}

impl From<f64> for Score {
    fn from(n: f64) -> Self {
        Score::Decimal(n)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Integer(n) => write!(f, "{n}"),
            Score::Decimal(n) => write!(f, "{n}"),
        }
    }
}

/// Risk as the caller expresses it: a numeric score or a level label such
/// as `"low"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Risk {
    Score(Score),
    Level(String),
}

impl From<Score> for Risk {
    fn from(score: Score) -> Self {
        Risk::Score(score)
    }
}

impl From<i32> for Risk {
    fn from(score: i32) -> Self {
        Risk::Score(score.into())
    }
}

impl From<i64> for Risk {
    fn from(score: i64) -> Self {
        Risk::Score(score.into())
    }
}

impl From<f64> for Risk {
    fn from(score: f64) -> Self {
        Risk::Score(score.into())
    }
}

impl From<&str> for Risk {
    fn from(level: &str) -> Self {
        Risk::Level(level.to_string())
    }
}

impl From<String> for Risk {
    fn from(level: String) -> Self {
        Risk::Level(level)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /recommend-loans`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecommendationRequest {
    pub user_id: UserId,
    pub score: Score,
    pub risk: Risk,
}

/// Body of `POST /submit-loan`. The application form is sent as-is, so this
/// is an open JSON object rather than a fixed record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanApplication(pub Map<String, Value>);

impl LoanApplication {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body of `POST /verify-compliance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRequest {
    /// KYC record as captured by the form, for example `{"idNumber": ...}`.
    pub user_data: Value,
    pub document_text: String,
    pub transaction_data: Vec<f64>,
    pub bio_data: Option<Vec<f64>>,
}

/// Body of `POST /enroll-biometric`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricEnrollment {
    pub user_id: UserId,
    pub bio_data: Vec<f64>,
}

/// Social network features used to refine a credit score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialGraph {
    #[serde(default)]
    pub nodes: Vec<f64>,
    #[serde(default)]
    pub connections: Vec<Vec<f64>>,
}

/// Body of `POST /assess-credit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAssessmentRequest {
    pub data: Vec<f64>,
    pub social_data: Option<SocialGraph>,
}

/// Body of `POST /track-esg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsgTrackingRequest {
    pub source_data: BTreeMap<String, Vec<f64>>,
    pub factors: Vec<f64>,
    pub impact_data: Vec<f64>,
    pub risk: Option<Risk>,
}

// ---------------------------------------------------------------------------
// Responses
//
// Fields the backend adds beyond the known ones are kept in `extra` and
// serialize back out unchanged.
// ---------------------------------------------------------------------------

/// Loan amount and rate proposed for a score/risk pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub amount: f64,
    pub rate: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `POST /recommend-loans`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecommendations {
    pub recommendations: Vec<Value>,
    pub terms: LoanTerms,
    #[serde(default)]
    pub guidance: Option<Value>,
    #[serde(default)]
    pub game_reward: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Plain confirmation returned by endpoints that only record data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `POST /verify-compliance`. `biometric_verified` is `null`
/// when no biometric sample was checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub kyc_verified: bool,
    pub document_verified: bool,
    pub aml_check_passed: bool,
    #[serde(default)]
    pub biometric_verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `POST /assess-credit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAssessment {
    pub alternative_score: f64,
    #[serde(default)]
    pub gnn_score: Option<Vec<f64>>,
    pub final_score: f64,
    pub federated_score: f64,
    pub dynamic_score: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `POST /track-esg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsgReport {
    pub aggregated_data: Value,
    pub esg_score: f64,
    pub impact: Value,
    pub optimized_balance: Value,
    pub visualization: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
