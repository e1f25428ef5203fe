//! Client core for the micro-finance web application.
//!
//! # Overview
//! Two independent pieces:
//! - `router`: the static page table, lazy view loading and scroll
//!   restoration.
//! - `service` / `client`: the backend API, one async call per endpoint.
//!
//! # Design
//! - `LoanClient` is stateless; it only shapes `HttpRequest` values and
//!   parses `HttpResponse` values (host-does-IO split).
//! - `LoanService` runs those through a `Transport`, by default the
//!   `reqwest`-backed `HttpTransport`.
//! - The base URL comes from `AppConfig`, passed in explicitly.
//! - Request/response DTOs are defined independently from the mock backend
//!   crate; integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod router;
pub mod service;
pub mod transport;
pub mod types;

pub use client::{Endpoint, LoanClient};
pub use config::AppConfig;
pub use error::{ApiError, ConfigError, RouteError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use router::{
    on_navigate, Navigation, Resolution, Route, RouteName, RouteTable, Router, ScrollPosition,
    View,
};
pub use service::LoanService;
pub use transport::{HttpTransport, Transport};
pub use types::{
    Acknowledgement, BiometricEnrollment, ComplianceReport, ComplianceRequest, CreditAssessment,
    CreditAssessmentRequest, EsgReport, EsgTrackingRequest, LoanApplication,
    LoanRecommendationRequest, LoanRecommendations, LoanTerms, Risk, Score, SocialGraph, UserId,
};
