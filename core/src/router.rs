//! Client-side page routing.
//!
//! # Design
//! The route table is fixed at startup. Each `Route` owns a loader that is
//! run on the first navigation to it and cached afterwards, so views cost
//! nothing until they are visited. `Router` adds the history base, tracks the
//! active route, and decides where to scroll after each navigation.
//!
//! Matching follows history-router defaults: query string and fragment are
//! ignored, a trailing slash is tolerated, and comparison is ASCII
//! case-insensitive. Anything else resolves to `Resolution::NotFound`, which
//! the view layer renders however it likes.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use crate::config::AppConfig;
use crate::error::RouteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Dashboard,
    CreditworthinessAssessment,
    ComplianceVerification,
    BehavioralAnalysis,
    EsgTracking,
    LoanRecommendations,
    TrainModels,
    SetComplianceRule,
    EnrollBiometric,
    UserGuide,
    About,
    Contact,
    Faq,
    Privacy,
}

impl RouteName {
    pub const ALL: [RouteName; 14] = [
        RouteName::Dashboard,
        RouteName::CreditworthinessAssessment,
        RouteName::ComplianceVerification,
        RouteName::BehavioralAnalysis,
        RouteName::EsgTracking,
        RouteName::LoanRecommendations,
        RouteName::TrainModels,
        RouteName::SetComplianceRule,
        RouteName::EnrollBiometric,
        RouteName::UserGuide,
        RouteName::About,
        RouteName::Contact,
        RouteName::Faq,
        RouteName::Privacy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RouteName::Dashboard => "Dashboard",
            RouteName::CreditworthinessAssessment => "CreditworthinessAssessment",
            RouteName::ComplianceVerification => "ComplianceVerification",
            RouteName::BehavioralAnalysis => "BehavioralAnalysis",
            RouteName::EsgTracking => "ESGTracking",
            RouteName::LoanRecommendations => "LoanRecommendations",
            RouteName::TrainModels => "TrainModels",
            RouteName::SetComplianceRule => "SetComplianceRule",
            RouteName::EnrollBiometric => "EnrollBiometric",
            RouteName::UserGuide => "UserGuide",
            RouteName::About => "About",
            RouteName::Contact => "Contact",
            RouteName::Faq => "FAQ",
            RouteName::Privacy => "Privacy",
        }
    }

    /// Path of this route in the standard table.
    pub fn path(self) -> &'static str {
        match self {
            RouteName::Dashboard => "/",
            RouteName::CreditworthinessAssessment => "/creditworthiness",
            RouteName::ComplianceVerification => "/compliance",
            RouteName::BehavioralAnalysis => "/behavioral",
            RouteName::EsgTracking => "/esg",
            RouteName::LoanRecommendations => "/loans",
            RouteName::TrainModels => "/train",
            RouteName::SetComplianceRule => "/compliance-rules",
            RouteName::EnrollBiometric => "/biometric",
            RouteName::UserGuide => "/guide",
            RouteName::About => "/about",
            RouteName::Contact => "/contact",
            RouteName::Faq => "/faq",
            RouteName::Privacy => "/privacy",
        }
    }

    fn component(self) -> &'static str {
        match self {
            RouteName::Dashboard => "DashboardView",
            RouteName::CreditworthinessAssessment => "CreditworthinessView",
            RouteName::ComplianceVerification => "ComplianceView",
            RouteName::BehavioralAnalysis => "BehavioralView",
            RouteName::EsgTracking => "ESGView",
            RouteName::LoanRecommendations => "LoanRecommendationsView",
            RouteName::TrainModels => "TrainModelsView",
            RouteName::SetComplianceRule => "ComplianceRulesView",
            RouteName::EnrollBiometric => "BiometricView",
            RouteName::UserGuide => "UserGuideView",
            RouteName::About => "AboutView",
            RouteName::Contact => "ContactView",
            RouteName::Faq => "FAQView",
            RouteName::Privacy => "PrivacyView",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a loader produces: the component the view layer should mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub component: &'static str,
}

impl View {
    pub const fn new(component: &'static str) -> Self {
        Self { component }
    }
}

pub type ViewLoader = fn() -> View;

pub struct Route {
    path: &'static str,
    name: RouteName,
    loader: ViewLoader,
    view: OnceLock<View>,
}

impl Route {
    pub const fn new(path: &'static str, name: RouteName, loader: ViewLoader) -> Self {
        Self {
            path,
            name,
            loader,
            view: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn name(&self) -> RouteName {
        self.name
    }

    /// The route's view, running the loader on first access only.
    pub fn view(&self) -> &View {
        self.view.get_or_init(|| {
            tracing::debug!(route = %self.name, path = self.path, "loading view");
            (self.loader)()
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.view.get().is_some()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[derive(Debug)]
pub enum Resolution<'a> {
    Matched(&'a Route),
    NotFound { path: String },
}

impl<'a> Resolution<'a> {
    pub fn route(&self) -> Option<&'a Route> {
        match self {
            Resolution::Matched(route) => Some(*route),
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound { .. })
    }
}

#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a custom table, rejecting duplicate paths or names.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteError> {
        let mut paths = HashSet::new();
        let mut names = HashSet::new();
        for route in &routes {
            if !route.path.starts_with('/') {
                return Err(RouteError::InvalidPath(route.path.to_string()));
            }
            if !paths.insert(normalize(route.path).to_ascii_lowercase()) {
                return Err(RouteError::DuplicatePath(route.path.to_string()));
            }
            if !names.insert(route.name) {
                return Err(RouteError::DuplicateName(route.name.to_string()));
            }
        }
        Ok(Self { routes })
    }

    /// The application's fourteen pages.
    pub fn standard() -> Self {
        let routes = RouteName::ALL
            .iter()
            .map(|&name| Route::new(name.path(), name, standard_loader(name)))
            .collect();
        Self { routes }
    }

    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        let wanted = normalize(path);
        self.routes
            .iter()
            .find(|route| normalize(route.path).eq_ignore_ascii_case(wanted))
            .map_or_else(
                || Resolution::NotFound {
                    path: path.to_string(),
                },
                Resolution::Matched,
            )
    }

    pub fn by_name(&self, name: RouteName) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn standard_loader(name: RouteName) -> ViewLoader {
    match name {
        RouteName::Dashboard => || View::new(RouteName::Dashboard.component()),
        RouteName::CreditworthinessAssessment => {
            || View::new(RouteName::CreditworthinessAssessment.component())
        }
        RouteName::ComplianceVerification => {
            || View::new(RouteName::ComplianceVerification.component())
        }
        RouteName::BehavioralAnalysis => || View::new(RouteName::BehavioralAnalysis.component()),
        RouteName::EsgTracking => || View::new(RouteName::EsgTracking.component()),
        RouteName::LoanRecommendations => || View::new(RouteName::LoanRecommendations.component()),
        RouteName::TrainModels => || View::new(RouteName::TrainModels.component()),
        RouteName::SetComplianceRule => || View::new(RouteName::SetComplianceRule.component()),
        RouteName::EnrollBiometric => || View::new(RouteName::EnrollBiometric.component()),
        RouteName::UserGuide => || View::new(RouteName::UserGuide.component()),
        RouteName::About => || View::new(RouteName::About.component()),
        RouteName::Contact => || View::new(RouteName::Contact.component()),
        RouteName::Faq => || View::new(RouteName::Faq.component()),
        RouteName::Privacy => || View::new(RouteName::Privacy.component()),
    }
}

/// Drop query and fragment, then any trailing slash (but keep the root).
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Scroll offset in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    pub left: f64,
    pub top: f64,
}

impl ScrollPosition {
    pub const TOP: ScrollPosition = ScrollPosition { left: 0.0, top: 0.0 };

    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Where to scroll after navigating from `from` to `to`: back to the saved
/// offset on history traversal, otherwise the top of the page.
pub fn on_navigate(
    _to: &str,
    _from: Option<&str>,
    saved_position: Option<ScrollPosition>,
) -> ScrollPosition {
    saved_position.unwrap_or(ScrollPosition::TOP)
}

#[derive(Debug)]
pub struct Navigation<'a> {
    pub resolution: Resolution<'a>,
    pub scroll: ScrollPosition,
}

#[derive(Debug)]
pub struct Router {
    base: String,
    routes: RouteTable,
    location: Option<String>,
    current: Option<RouteName>,
}

impl Router {
    pub fn new(base: &str, routes: RouteTable) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            routes,
            location: None,
            current: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.router_base, RouteTable::standard())
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Resolve a full location path, history base included.
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        match self.strip_base(path) {
            Some(relative) => self.routes.resolve(relative),
            None => Resolution::NotFound {
                path: path.to_string(),
            },
        }
    }

    /// Navigate to `to`. A matched route becomes active and its view is
    /// loaded if this is the first visit; an unmatched path leaves no route
    /// active.
    pub fn navigate(&mut self, to: &str, saved_position: Option<ScrollPosition>) -> Navigation<'_> {
        let scroll = on_navigate(to, self.location.as_deref(), saved_position);
        let matched = self.resolve(to).route().map(Route::name);
        match matched {
            Some(name) => tracing::debug!(route = %name, path = to, "navigated"),
            None => tracing::debug!(path = to, "no route matched"),
        }
        self.current = matched;
        self.location = Some(to.to_string());

        let resolution = self.resolve(to);
        if let Some(route) = resolution.route() {
            route.view();
        }
        Navigation { resolution, scroll }
    }

    pub fn current(&self) -> Option<&Route> {
        self.current.and_then(|name| self.routes.by_name(name))
    }

    /// Link target for a named route, history base included.
    pub fn href(&self, name: RouteName) -> Option<String> {
        let route = self.routes.by_name(name)?;
        if route.path == "/" && !self.base.is_empty() {
            return Some(format!("{}/", self.base));
        }
        Some(format!("{}{}", self.base, route.path))
    }

    fn strip_base<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.base.is_empty() {
            return Some(path);
        }
        let prefix = path.get(..self.base.len())?;
        if !prefix.eq_ignore_ascii_case(&self.base) {
            return None;
        }
        let rest = &path[self.base.len()..];
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with(['/', '?', '#']) {
            Some(rest)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn every_standard_route_resolves_to_its_view() {
        let table = RouteTable::standard();
        assert_eq!(table.len(), 14);
        for name in RouteName::ALL {
            let route = table.resolve(name.path()).route().expect("route registered");
            assert_eq!(route.name(), name);
            assert_eq!(route.view().component, name.component());
        }
    }

    #[test]
    fn unknown_path_is_not_found() {
        let table = RouteTable::standard();
        let resolution = table.resolve("/does-not-exist");
        assert!(resolution.is_not_found());
        assert!(resolution.route().is_none());
    }

    #[test]
    fn matching_ignores_query_fragment_trailing_slash_and_case() {
        let table = RouteTable::standard();
        for path in ["/loans?user=1", "/loans#terms", "/loans/", "/LOANS"] {
            let route = table.resolve(path).route().expect(path);
            assert_eq!(route.name(), RouteName::LoanRecommendations, "{path}");
        }
        assert_eq!(
            table.resolve("").route().map(Route::name),
            Some(RouteName::Dashboard)
        );
    }

    #[test]
    fn compliance_rules_does_not_shadow_compliance() {
        let table = RouteTable::standard();
        assert_eq!(
            table.resolve("/compliance").route().map(Route::name),
            Some(RouteName::ComplianceVerification)
        );
        assert_eq!(
            table.resolve("/compliance-rules").route().map(Route::name),
            Some(RouteName::SetComplianceRule)
        );
    }

    static LOADS: AtomicUsize = AtomicUsize::new(0);

    fn counting_loader() -> View {
        LOADS.fetch_add(1, Ordering::SeqCst);
        View::new("CountingView")
    }

    #[test]
    fn views_load_lazily_and_once() {
        let table =
            RouteTable::new(vec![Route::new("/count", RouteName::About, counting_loader)]).unwrap();
        let route = table.resolve("/count").route().unwrap();
        assert!(!route.is_loaded());
        assert_eq!(LOADS.load(Ordering::SeqCst), 0);

        route.view();
        route.view();
        assert!(route.is_loaded());
        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn custom_table_rejects_duplicates_and_relative_paths() {
        let dup_path = RouteTable::new(vec![
            Route::new("/a", RouteName::About, || View::new("A")),
            Route::new("/a/", RouteName::Contact, || View::new("B")),
        ]);
        assert_eq!(dup_path.unwrap_err(), RouteError::DuplicatePath("/a/".to_string()));

        let dup_name = RouteTable::new(vec![
            Route::new("/a", RouteName::About, || View::new("A")),
            Route::new("/b", RouteName::About, || View::new("B")),
        ]);
        assert_eq!(dup_name.unwrap_err(), RouteError::DuplicateName("About".to_string()));

        let relative = RouteTable::new(vec![Route::new("a", RouteName::About, || View::new("A"))]);
        assert_eq!(relative.unwrap_err(), RouteError::InvalidPath("a".to_string()));
    }

    #[test]
    fn on_navigate_restores_saved_position() {
        let saved = ScrollPosition::new(0.0, 840.0);
        assert_eq!(on_navigate("/esg", Some("/"), Some(saved)), saved);
    }

    #[test]
    fn on_navigate_without_saved_position_scrolls_to_top() {
        assert_eq!(on_navigate("/esg", Some("/"), None), ScrollPosition::TOP);
        assert_eq!(on_navigate("/", None, None), ScrollPosition { left: 0.0, top: 0.0 });
    }

    #[test]
    fn navigate_marks_route_active_and_loads_view() {
        let mut router = Router::new("/", RouteTable::standard());
        assert!(router.current().is_none());

        let nav = router.navigate("/biometric", None);
        assert_eq!(nav.scroll, ScrollPosition::TOP);
        let route = nav.resolution.route().unwrap();
        assert!(route.is_loaded());

        let current = router.current().unwrap();
        assert_eq!(current.name(), RouteName::EnrollBiometric);
    }

    #[test]
    fn navigate_to_unknown_path_clears_active_route() {
        let mut router = Router::new("/", RouteTable::standard());
        router.navigate("/faq", None);
        let nav = router.navigate("/nowhere", Some(ScrollPosition::new(0.0, 12.0)));
        assert!(nav.resolution.is_not_found());
        assert_eq!(nav.scroll, ScrollPosition::new(0.0, 12.0));
        assert!(router.current().is_none());
    }

    #[test]
    fn history_base_is_stripped_before_matching() {
        let router = Router::new("/app/", RouteTable::standard());
        assert_eq!(
            router.resolve("/app/esg").route().map(Route::name),
            Some(RouteName::EsgTracking)
        );
        assert_eq!(
            router.resolve("/app").route().map(Route::name),
            Some(RouteName::Dashboard)
        );
        assert!(router.resolve("/esg").is_not_found());
        assert!(router.resolve("/application/esg").is_not_found());
    }

    #[test]
    fn history_base_matches_regardless_of_case() {
        let router = Router::new("/app", RouteTable::standard());
        assert_eq!(
            router.resolve("/APP/esg").route().map(Route::name),
            Some(RouteName::EsgTracking)
        );
        assert_eq!(
            router.resolve("/App/ESG").route().map(Route::name),
            Some(RouteName::EsgTracking)
        );
        assert_eq!(
            router.resolve("/APP").route().map(Route::name),
            Some(RouteName::Dashboard)
        );
        // base length falls inside a multi-byte character
        assert!(router.resolve("/a\u{20ac}/esg").is_not_found());
        assert!(router.resolve("/ap").is_not_found());
    }

    #[test]
    fn href_prefixes_base() {
        let router = Router::new("/app", RouteTable::standard());
        assert_eq!(router.href(RouteName::Faq).as_deref(), Some("/app/faq"));
        assert_eq!(router.href(RouteName::Dashboard).as_deref(), Some("/app/"));

        let root = Router::from_config(&AppConfig::default());
        assert_eq!(root.href(RouteName::Privacy).as_deref(), Some("/privacy"));
        assert_eq!(root.href(RouteName::Dashboard).as_deref(), Some("/"));
    }
}
