// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! View Router
//!
//! Pure mapping from a dashboard location (`/app/42`, `#/node/docker?node_name=alpha`)
//! to the page that renders it and the parameters that page receives.
//! Resolution never builds a page; [`ViewRouter::materialize`] does that on
//! demand.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Parameters handed to a page.
pub type Params = BTreeMap<String, String>;

/// Chooses which of the matched values a page receives.
pub type PropsFn = fn(&RouteMatch<'_>) -> Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Dashboard,
    NodeManager,
    Docker,
    Applications,
    ApplicationDeploy,
}

/// Values available to a route's props function.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// Named `:segment` captures
    pub path_params: &'a Params,
    pub query: &'a Params,
}

#[derive(Debug, Clone, Copy)]
pub enum RouteTarget {
    Page { page: Page, props: PropsFn },
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub target: RouteTarget,
}

impl Route {
    pub const fn page(path: &'static str, name: &'static str, page: Page, props: PropsFn) -> Self {
        Self {
            path,
            name,
            target: RouteTarget::Page { page, props },
        }
    }

    pub const fn redirect(path: &'static str, name: &'static str, to: &'static str) -> Self {
        Self {
            path,
            name,
            target: RouteTarget::Redirect(to),
        }
    }

    fn pattern(&self) -> impl Iterator<Item = &'static str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    fn capture(&self, segments: &[String]) -> Option<Params> {
        let pattern: Vec<&str> = self.pattern().collect();
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (expected, actual) in pattern.iter().zip(segments) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), actual.clone());
                }
                None if *expected == actual.as_str() => {}
                None => return None,
            }
        }
        Some(params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedView {
    pub page: Page,
    /// Route name, e.g. `app_deploy`
    pub name: &'static str,
    /// Normalised path that matched
    pub path: String,
    pub params: Params,
    /// Location originally asked for, when a redirect was followed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<String>,
}

impl ResolvedView {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("Default location {0} does not resolve to a page")]
    DefaultNotAPage(String),

    #[error("Redirect {from} -> {to} does not land on a page")]
    DanglingRedirect { from: String, to: String },
}

fn no_props(_: &RouteMatch<'_>) -> Params {
    Params::new()
}

fn pick(source: &Params, key: &str) -> Params {
    source
        .get(key)
        .map(|value| Params::from([(key.to_string(), value.clone())]))
        .unwrap_or_default()
}

fn node_name_from_query(m: &RouteMatch<'_>) -> Params {
    pick(m.query, "node_name")
}

fn id_from_path(m: &RouteMatch<'_>) -> Params {
    pick(m.path_params, "id")
}

/// Routes of the dashboard.
pub const DASHBOARD_ROUTES: &[Route] = &[
    Route::redirect("/", "home", "/dashboard"),
    Route::page("/dashboard", "dashboard", Page::Dashboard, no_props),
    Route::page("/node", "node", Page::NodeManager, no_props),
    Route::page("/node/docker", "docker", Page::Docker, node_name_from_query),
    Route::page("/app", "app", Page::Applications, no_props),
    Route::page("/app/:id", "app_deploy", Page::ApplicationDeploy, id_from_path),
];

pub const DEFAULT_LOCATION: &str = "/dashboard";

struct Location {
    segments: Vec<String>,
    query: Params,
}

impl Location {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_start_matches('#');
        let raw = raw.split('#').next().unwrap_or_default();
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));

        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();

        let mut params = Params::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }

        Self {
            segments,
            query: params,
        }
    }

    fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

#[derive(Debug, Clone)]
pub struct ViewRouter {
    routes: Vec<Route>,
    default_location: &'static str,
}

impl ViewRouter {
    /// Build a router, checking that the default location and every
    /// redirect land on a page route.
    pub fn new(routes: Vec<Route>, default_location: &'static str) -> Result<Self, RouterError> {
        let router = Self {
            routes,
            default_location,
        };

        if router.match_page(&Location::parse(default_location), None).is_none() {
            return Err(RouterError::DefaultNotAPage(default_location.to_string()));
        }
        for route in &router.routes {
            if let RouteTarget::Redirect(to) = route.target {
                if router.match_page(&Location::parse(to), None).is_none() {
                    return Err(RouterError::DanglingRedirect {
                        from: route.path.to_string(),
                        to: to.to_string(),
                    });
                }
            }
        }

        Ok(router)
    }

    /// The dashboard's route table with `/dashboard` as fallback.
    pub fn dashboard() -> Self {
        Self {
            routes: DASHBOARD_ROUTES.to_vec(),
            default_location: DEFAULT_LOCATION,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolve `location` to exactly one page.
    ///
    /// Unknown locations redirect to the default location.
    pub fn resolve(&self, location: &str) -> ResolvedView {
        let parsed = Location::parse(location);

        for route in &self.routes {
            let Some(path_params) = route.capture(&parsed.segments) else {
                continue;
            };
            match route.target {
                RouteTarget::Page { page, props } => {
                    return Self::view(route, page, props, &parsed, &path_params, None);
                }
                RouteTarget::Redirect(to) => {
                    debug!(from = %location, to, "Following route redirect");
                    if let Some(view) = self.match_page(&Location::parse(to), Some(location)) {
                        return view;
                    }
                }
            }
        }

        debug!(location, fallback = self.default_location, "No route matched");
        self.fallback(location)
    }

    /// Build the page for a resolved view.
    pub fn materialize<V, F>(&self, view: &ResolvedView, factory: F) -> V
    where
        F: FnOnce(Page, &Params) -> V,
    {
        factory(view.page, &view.params)
    }

    fn match_page(
        &self,
        location: &Location,
        redirected_from: Option<&str>,
    ) -> Option<ResolvedView> {
        self.routes.iter().find_map(|route| match route.target {
            RouteTarget::Page { page, props } => {
                route.capture(&location.segments).map(|captured| {
                    Self::view(route, page, props, location, &captured, redirected_from)
                })
            }
            RouteTarget::Redirect(_) => None,
        })
    }

    fn fallback(&self, location: &str) -> ResolvedView {
        match self.match_page(&Location::parse(self.default_location), Some(location)) {
            Some(view) => view,
            // `new` guarantees the default resolves; `dashboard()` uses a known-good table.
            None => ResolvedView {
                page: Page::Dashboard,
                name: "dashboard",
                path: self.default_location.to_string(),
                params: Params::new(),
                redirected_from: Some(location.to_string()),
            },
        }
    }

    fn view(
        route: &Route,
        page: Page,
        props: PropsFn,
        location: &Location,
        path_params: &Params,
        redirected_from: Option<&str>,
    ) -> ResolvedView {
        let matched = RouteMatch {
            path_params,
            query: &location.query,
        };
        ResolvedView {
            page,
            name: route.name,
            path: location.path(),
            params: props(&matched),
            redirected_from: redirected_from.map(str::to_string),
        }
    }
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::dashboard()
    }
}
