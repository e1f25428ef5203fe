//! In-process stand-in for the micro-finance backend.
//!
//! Serves the six JSON endpoints the client calls, with small deterministic
//! rules in place of the real scoring models. Enough state is kept (KYC
//! records, biometric templates, submitted applications) for multi-step
//! flows such as enroll-then-verify to behave like the real service.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Biometric samples closer than this (sum of absolute differences) match.
pub const BIOMETRIC_DRIFT_THRESHOLD: f64 = 0.1;
/// Mean transaction deviation above which AML flags an anomaly.
pub const AML_THRESHOLD: f64 = 1.0;
pub const DEFAULT_ESG_RISK: f64 = 0.5;
const CATALOGUE_SIZE: u64 = 5;

#[derive(Debug, Default)]
pub struct Backend {
    kyc_records: HashSet<String>,
    biometrics: HashMap<String, Vec<f64>>,
    applications: HashMap<Uuid, Value>,
}

impl Backend {
    pub fn application_count(&self) -> usize {
        self.applications.len()
    }

    pub fn is_enrolled(&self, user_id: &str) -> bool {
        self.biometrics.contains_key(user_id)
    }
}

pub type Db = Arc<RwLock<Backend>>;

pub fn app() -> Router {
    app_with_state(Db::default())
}

/// Router over caller-owned state, so tests can inspect it afterwards.
pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/recommend-loans", post(recommend_loans))
        .route("/submit-loan", post(submit_loan))
        .route("/verify-compliance", post(verify_compliance))
        .route("/enroll-biometric", post(enroll_biometric))
        .route("/assess-credit", post(assess_credit))
        .route("/track-esg", post(track_esg))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// 400 with the backend's error body.
#[derive(Debug)]
pub struct MissingData;

impl IntoResponse for MissingData {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing required data"})),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Inputs. Every field is optional so that absence maps to 400, not 422.
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct RecommendInput {
    pub user_id: Option<Value>,
    pub score: Option<f64>,
    pub risk: Option<Value>,
}

#[derive(Deserialize)]
pub struct ComplianceInput {
    pub user_data: Option<Value>,
    pub document_text: Option<String>,
    pub transaction_data: Option<Vec<f64>>,
    pub bio_data: Option<Vec<f64>>,
}

#[derive(Deserialize)]
pub struct EnrollInput {
    pub user_id: Option<Value>,
    pub bio_data: Option<Vec<f64>>,
}

#[derive(Deserialize)]
pub struct SocialInput {
    #[serde(default)]
    pub nodes: Vec<f64>,
}

#[derive(Deserialize)]
pub struct CreditInput {
    pub data: Option<Vec<f64>>,
    pub social_data: Option<SocialInput>,
}

#[derive(Deserialize)]
pub struct EsgInput {
    pub source_data: Option<BTreeMap<String, Vec<f64>>>,
    pub factors: Option<Vec<f64>>,
    pub impact_data: Option<Vec<f64>>,
    pub risk: Option<Value>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn recommend_loans(Json(input): Json<RecommendInput>) -> Result<Json<Value>, MissingData> {
    let (Some(user_id), Some(score), Some(risk)) = (input.user_id, input.score, input.risk) else {
        return Err(MissingData);
    };
    let risk = risk_value(&risk).ok_or(MissingData)?;

    let offset = key_of(&user_id).bytes().map(u64::from).sum::<u64>() % CATALOGUE_SIZE;
    let recommendations: Vec<u64> = (0..3).map(|i| (offset + i) % CATALOGUE_SIZE).collect();

    Ok(Json(json!({
        "recommendations": recommendations,
        "terms": {"amount": score * 1000.0, "rate": score / (risk + 1.0)},
        "guidance": null,
        "game_reward": null,
    })))
}

async fn submit_loan(State(db): State<Db>, Json(application): Json<Value>) -> Json<Value> {
    let id = Uuid::new_v4();
    db.write().await.applications.insert(id, application);
    tracing::info!(%id, "loan application stored");
    Json(json!({"message": "Application submitted successfully"}))
}

async fn verify_compliance(
    State(db): State<Db>,
    Json(input): Json<ComplianceInput>,
) -> Result<Json<Value>, MissingData> {
    let user_data = input.user_data.filter(is_truthy).ok_or(MissingData)?;
    let document_text = input
        .document_text
        .filter(|t| !t.is_empty())
        .ok_or(MissingData)?;
    let transactions = input
        .transaction_data
        .filter(|t| !t.is_empty())
        .ok_or(MissingData)?;

    let mut backend = db.write().await;
    let kyc_verified = !backend.kyc_records.insert(user_data.to_string());
    let biometric_verified = match (input.bio_data.filter(|b| !b.is_empty()), user_data.get("idNumber")) {
        (Some(sample), Some(id)) => Some(
            backend
                .biometrics
                .get(&key_of(id))
                .is_some_and(|stored| drift(stored, &sample) < BIOMETRIC_DRIFT_THRESHOLD),
        ),
        _ => None,
    };

    Ok(Json(json!({
        "kyc_verified": kyc_verified,
        "document_verified": document_passes(&document_text),
        "aml_check_passed": !aml_anomaly(&transactions),
        "biometric_verified": biometric_verified,
    })))
}

async fn enroll_biometric(
    State(db): State<Db>,
    Json(input): Json<EnrollInput>,
) -> Result<Json<Value>, MissingData> {
    let user_id = input.user_id.filter(is_truthy).ok_or(MissingData)?;
    let bio_data = input.bio_data.filter(|b| !b.is_empty()).ok_or(MissingData)?;
    db.write().await.biometrics.insert(key_of(&user_id), bio_data);
    Ok(Json(json!({"message": "Biometric data enrolled successfully"})))
}

async fn assess_credit(Json(input): Json<CreditInput>) -> Result<Json<Value>, MissingData> {
    let data = input.data.filter(|d| !d.is_empty()).ok_or(MissingData)?;
    let alternative_score = mean(&data);

    let gnn_score = input
        .social_data
        .map(|social| social.nodes)
        .filter(|nodes| !nodes.is_empty());
    let final_score = match &gnn_score {
        Some(nodes) => (alternative_score + mean(nodes)) / 2.0,
        None => alternative_score,
    };

    Ok(Json(json!({
        "alternative_score": alternative_score,
        "gnn_score": gnn_score,
        "final_score": final_score,
        "federated_score": alternative_score,
        "dynamic_score": final_score,
    })))
}

async fn track_esg(Json(input): Json<EsgInput>) -> Result<Json<Value>, MissingData> {
    let source_data = input.source_data.filter(|s| !s.is_empty()).ok_or(MissingData)?;
    let factors = input.factors.filter(|f| !f.is_empty()).ok_or(MissingData)?;
    let impact_data = input.impact_data.filter(|i| !i.is_empty()).ok_or(MissingData)?;
    let risk = match input.risk {
        None | Some(Value::Null) => DEFAULT_ESG_RISK,
        Some(risk) => risk_value(&risk).ok_or(MissingData)?,
    };

    let aggregated: Map<String, Value> = source_data
        .iter()
        .map(|(source, values)| (source.clone(), json!(mean(values))))
        .collect();
    let esg_score = factors
        .iter()
        .zip(&impact_data)
        .map(|(f, i)| f * i)
        .sum::<f64>()
        / factors.len() as f64;
    let impact = impact_data.iter().sum::<f64>() * (1.0 - risk);
    let visualization: Vec<&String> = source_data.keys().collect();

    Ok(Json(json!({
        "aggregated_data": aggregated,
        "esg_score": esg_score,
        "impact": impact,
        "optimized_balance": {"esg": esg_score * (1.0 - risk), "risk": risk},
        "visualization": visualization,
    })))
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn drift(stored: &[f64], sample: &[f64]) -> f64 {
    stored.iter().zip(sample).map(|(a, b)| (a - b).abs()).sum()
}

fn aml_anomaly(transactions: &[f64]) -> bool {
    mean(&transactions[..transactions.len().min(5)]).abs() > AML_THRESHOLD
}

/// Passes when the text carries at least two of: capitals (name), digits or
/// dashes (date), capitals or digits (id).
fn document_passes(text: &str) -> bool {
    let rules: [fn(char) -> bool; 3] = [
        |c| c.is_ascii_uppercase(),
        |c| c.is_ascii_digit() || c == '-',
        |c| c.is_ascii_uppercase() || c.is_ascii_digit(),
    ];
    let score = rules.iter().filter(|rule| text.chars().any(|c| rule(c))).count();
    score * 2 > rules.len()
}

/// Numeric risk, or a level label mapped onto the same scale.
fn risk_value(risk: &Value) -> Option<f64> {
    match risk {
        Value::Number(n) => n.as_f64(),
        Value::String(level) => match level.to_ascii_lowercase().as_str() {
            "low" => Some(0.2),
            "medium" => Some(0.5),
            "high" => Some(0.8),
            _ => None,
        },
        _ => None,
    }
}

fn key_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_needs_two_of_three_patterns() {
        assert!(document_passes("JOHN DOE 1990-01-01"));
        assert!(document_passes("ABC"));
        assert!(!document_passes("lowercase only"));
        assert!(!document_passes("---"));
    }

    #[test]
    fn aml_flags_large_mean_deviation() {
        assert!(!aml_anomaly(&[0.5, -0.5, 0.2]));
        assert!(aml_anomaly(&[5.0, 5.0]));
        // only the first five features count
        assert!(!aml_anomaly(&[0.0, 0.0, 0.0, 0.0, 0.0, 100.0]));
    }

    #[test]
    fn risk_labels_map_to_scores() {
        assert_eq!(risk_value(&json!("low")), Some(0.2));
        assert_eq!(risk_value(&json!("HIGH")), Some(0.8));
        assert_eq!(risk_value(&json!(0.3)), Some(0.3));
        assert_eq!(risk_value(&json!("unknown")), None);
        assert_eq!(risk_value(&json!(true)), None);
    }

    #[test]
    fn drift_sums_absolute_differences() {
        assert!((drift(&[0.1, 0.2], &[0.1, 0.25]) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn numeric_and_text_ids_share_key_space() {
        assert_eq!(key_of(&json!("ID-7")), "ID-7");
        assert_eq!(key_of(&json!(7)), "7");
    }

    #[test]
    fn empty_values_are_falsy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!({"idNumber": "A"})));
        assert!(is_truthy(&json!(0)));
    }
}
