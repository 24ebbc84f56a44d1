//! Endpoint registration and classification.
//!
//! Routes are registered through [`EndpointRouteBuilder`], which records an
//! [`EndpointMetadata`] entry per route template next to the axum
//! [`Router`]. At request time the template axum reports as
//! [`MatchedPath`](axum::extract::MatchedPath) is the key into the resulting
//! [`EndpointTable`].
//!
//! Controller routes describe themselves: mounting a [`Controller`] marks
//! every one of its actions. Lightweight handler routes carry no such
//! information and are tagged explicitly with
//! [`RouteRegistration::minimal_api`].

pub mod registration;

use std::collections::HashMap;

pub use registration::{Controller, EndpointRouteBuilder, RouteRegistration};

/// Metadata marker naming the registration mechanism of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleMarker {
    Controller,
    MinimalApi,
}

/// Classification of the endpoint a request was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointStyle {
    Controller,
    MinimalApi,
    Unclassified,
}

impl From<StyleMarker> for EndpointStyle {
    fn from(marker: StyleMarker) -> Self {
        match marker {
            StyleMarker::Controller => EndpointStyle::Controller,
            StyleMarker::MinimalApi => EndpointStyle::MinimalApi,
        }
    }
}

impl std::fmt::Display for EndpointStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointStyle::Controller => write!(f, "controller"),
            EndpointStyle::MinimalApi => write!(f, "minimal-api"),
            EndpointStyle::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Access requirement attached to a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    AllowAnonymous,
    Authenticated,
    /// Authenticated, plus at least one of the listed roles.
    Roles(Vec<String>),
}

static ANONYMOUS: Authorization = Authorization::AllowAnonymous;

#[derive(Debug, Clone, Default)]
pub struct EndpointMetadata {
    name: Option<String>,
    markers: Vec<StyleMarker>,
    authorization: Option<Authorization>,
}

impl EndpointMetadata {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn markers(&self) -> &[StyleMarker] {
        &self.markers
    }

    /// Routes without an explicit requirement are open.
    pub fn authorization(&self) -> &Authorization {
        self.authorization.as_ref().unwrap_or(&ANONYMOUS)
    }

    pub fn style(&self) -> EndpointStyle {
        self.markers
            .first()
            .map(|marker| EndpointStyle::from(*marker))
            .unwrap_or(EndpointStyle::Unclassified)
    }

    pub(crate) fn insert_marker(&mut self, marker: StyleMarker) {
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
    }

    pub(crate) fn has_authorization(&self) -> bool {
        self.authorization.is_some()
    }

    pub(crate) fn set_authorization(&mut self, authorization: Authorization) {
        self.authorization = Some(authorization);
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
}

/// Immutable route template -> metadata lookup, built once at startup.
#[derive(Debug, Default)]
pub struct EndpointTable {
    endpoints: HashMap<String, EndpointMetadata>,
}

impl EndpointTable {
    pub(crate) fn new(endpoints: HashMap<String, EndpointMetadata>) -> Self {
        Self { endpoints }
    }

    pub fn get(&self, path: Option<&str>) -> Option<&EndpointMetadata> {
        path.and_then(|p| self.endpoints.get(p))
    }

    /// Requirement of the matched route; unknown routes are open.
    pub fn authorization(&self, path: Option<&str>) -> &Authorization {
        self.get(path)
            .map(EndpointMetadata::authorization)
            .unwrap_or(&ANONYMOUS)
    }

    /// Never fails: no route, an unknown route or a route without a marker
    /// all classify as [`EndpointStyle::Unclassified`].
    pub fn classify(&self, path: Option<&str>) -> EndpointStyle {
        self.get(path)
            .map(EndpointMetadata::style)
            .unwrap_or(EndpointStyle::Unclassified)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
