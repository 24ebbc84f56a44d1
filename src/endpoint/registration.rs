use std::collections::HashMap;

use axum::Router;
use axum::routing::MethodRouter;

use super::{Authorization, EndpointMetadata, EndpointTable, StyleMarker};
use crate::error::RegistrationError;

/// A route template, its handlers and the metadata recorded for it.
pub struct RouteRegistration<S> {
    path: String,
    method_router: MethodRouter<S>,
    metadata: EndpointMetadata,
}

impl<S> RouteRegistration<S> {
    pub fn new(path: impl Into<String>, method_router: MethodRouter<S>) -> Self {
        Self {
            path: path.into(),
            method_router,
            metadata: EndpointMetadata::default(),
        }
    }

    pub fn metadata(&self) -> &EndpointMetadata {
        &self.metadata
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.metadata.set_name(name.into());
        self
    }

    /// Tags the route as a lightweight API handler. Calling it more than once
    /// leaves a single marker.
    pub fn minimal_api(mut self) -> Self {
        self.metadata.insert_marker(StyleMarker::MinimalApi);
        self
    }

    pub fn allow_anonymous(mut self) -> Self {
        self.metadata.set_authorization(Authorization::AllowAnonymous);
        self
    }

    pub fn require_authorization(mut self) -> Self {
        self.metadata.set_authorization(Authorization::Authenticated);
        self
    }

    pub fn require_role(mut self, role: impl Into<String>) -> Self {
        let role = role.into();
        let roles = match self.metadata.authorization() {
            Authorization::Roles(existing) => {
                let mut roles = existing.clone();
                if !roles.contains(&role) {
                    roles.push(role);
                }
                roles
            }
            _ => vec![role],
        };
        self.metadata.set_authorization(Authorization::Roles(roles));
        self
    }
}

/// A group of attribute-style actions. Every action registered through
/// [`EndpointRouteBuilder::controller`] is marked as a controller endpoint.
pub trait Controller<S> {
    fn name(&self) -> &'static str;

    /// Requirement for actions that do not declare their own.
    fn authorization(&self) -> Authorization {
        Authorization::Authenticated
    }

    fn actions(&self) -> Vec<RouteRegistration<S>>;
}

pub struct EndpointRouteBuilder<S> {
    registrations: Vec<RouteRegistration<S>>,
}

impl<S> Default for EndpointRouteBuilder<S> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }
}

impl<S> EndpointRouteBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controller<C: Controller<S>>(mut self, controller: C) -> Self {
        for mut action in controller.actions() {
            action.metadata.insert_marker(StyleMarker::Controller);
            if !action.metadata.has_authorization() {
                action.metadata.set_authorization(controller.authorization());
            }
            if action.metadata.name().is_none() {
                let name = format!("{} {}", controller.name(), action.path);
                action.metadata.set_name(name);
            }
            self.registrations.push(action);
        }
        self
    }

    pub fn map(mut self, registration: RouteRegistration<S>) -> Self {
        self.registrations.push(registration);
        self
    }

    /// Produces the router and its metadata table. Fails on a route template
    /// registered twice or a route carrying more than one style marker.
    pub fn build(self) -> Result<(Router<S>, EndpointTable), RegistrationError> {
        let mut router = Router::new();
        let mut endpoints = HashMap::with_capacity(self.registrations.len());

        for registration in self.registrations {
            if endpoints.contains_key(&registration.path) {
                return Err(RegistrationError::DuplicateRoute(registration.path));
            }
            if registration.metadata.markers().len() > 1 {
                return Err(RegistrationError::ConflictingStyles(registration.path));
            }

            tracing::debug!(
                path = %registration.path,
                style = %registration.metadata.style(),
                "Registered endpoint"
            );

            router = router.route(&registration.path, registration.method_router);
            endpoints.insert(registration.path, registration.metadata);
        }

        Ok((router, EndpointTable::new(endpoints)))
    }
}
