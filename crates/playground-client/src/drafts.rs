//! Per-endpoint request drafts and the shared scorer/address binding.
//!
//! Every mounted draft subscribes to one [`GlobalParams`] store. Editing
//! `scorer_id` or `address` in any draft broadcasts the value, and the other
//! drafts that declare a parameter of that name pick it up on their next
//! [`RequestDraft::sync_globals`]. Dropping a draft unsubscribes it.

use crate::error::{ClientError, Result};
use crate::proxy::{ProxiedRequest, ProxyRequestBuilder};
use playground_openapi::{
    ParamValues, ParameterLocation, ParsedEndpoint, build_url, can_send_request,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

pub const SCORER_ID: &str = "scorer_id";
pub const ADDRESS: &str = "address";

/// Parameter names shared across drafts.
pub const GLOBAL_PARAM_NAMES: [&str; 2] = [SCORER_ID, ADDRESS];

pub fn is_global_param(name: &str) -> bool {
    GLOBAL_PARAM_NAMES.contains(&name)
}

/// Current shared values. `None` means never set in this session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalValues {
    pub scorer_id: Option<String>,
    pub address: Option<String>,
}

impl GlobalValues {
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            SCORER_ID => self.scorer_id.as_deref(),
            ADDRESS => self.address.as_deref(),
            _ => None,
        }
    }

    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            SCORER_ID => Some(&mut self.scorer_id),
            ADDRESS => Some(&mut self.address),
            _ => None,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        GLOBAL_PARAM_NAMES
            .into_iter()
            .filter_map(|name| self.get(name).map(|value| (name, value)))
    }
}

/// Shared scorer/address store with change notification.
#[derive(Debug, Clone)]
pub struct GlobalParams {
    tx: Arc<watch::Sender<GlobalValues>>,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalParams {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(GlobalValues::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> GlobalValues {
        self.tx.borrow().clone()
    }

    /// Store `value` under a global name. Returns false for other names or
    /// when the value is unchanged.
    pub fn set(&self, name: &str, value: &str) -> bool {
        self.tx.send_if_modified(|values| match values.slot(name) {
            Some(slot) if slot.as_deref() != Some(value) => {
                *slot = Some(value.to_string());
                true
            }
            _ => false,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<GlobalValues> {
        self.tx.subscribe()
    }

    /// Number of mounted drafts.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// The in-progress parameter values for one endpoint.
#[derive(Debug)]
pub struct RequestDraft {
    endpoint: ParsedEndpoint,
    path_params: ParamValues,
    query_params: ParamValues,
    globals: GlobalParams,
    updates: watch::Receiver<GlobalValues>,
}

impl RequestDraft {
    /// Mount a draft for `endpoint`.
    ///
    /// `scorer_id` is seeded from the shared value, else `default_scorer_id`.
    /// `address` is seeded from the shared value. Other path parameters start
    /// empty and query parameters start at their schema default.
    pub fn mount(
        endpoint: &ParsedEndpoint,
        globals: &GlobalParams,
        default_scorer_id: &str,
    ) -> Self {
        let mut updates = globals.subscribe();
        let shared = updates.borrow_and_update().clone();

        let path_params = endpoint
            .path_parameters()
            .map(|p| {
                let seeded = match (p.name.as_str(), shared.get(&p.name)) {
                    (_, Some(value)) if !value.is_empty() => value.to_string(),
                    (SCORER_ID, _) => default_scorer_id.to_string(),
                    _ => String::new(),
                };
                (p.name.clone(), seeded)
            })
            .collect();

        let query_params = endpoint
            .query_parameters()
            .map(|p| (p.name.clone(), p.schema.default_as_string()))
            .collect();

        debug!("Mounted draft for {}", endpoint.id);

        Self {
            endpoint: endpoint.clone(),
            path_params,
            query_params,
            globals: globals.clone(),
            updates,
        }
    }

    pub fn endpoint(&self) -> &ParsedEndpoint {
        &self.endpoint
    }

    pub fn path_params(&self) -> &ParamValues {
        &self.path_params
    }

    pub fn query_params(&self) -> &ParamValues {
        &self.query_params
    }

    pub fn set_path_param(&mut self, name: &str, value: &str) {
        self.path_params.insert(name.to_string(), value.to_string());
        self.broadcast(name, value);
    }

    pub fn set_query_param(&mut self, name: &str, value: &str) {
        self.query_params.insert(name.to_string(), value.to_string());
        self.broadcast(name, value);
    }

    fn broadcast(&mut self, name: &str, value: &str) {
        if is_global_param(name) && self.globals.set(name, value) {
            // our own write is already applied
            self.updates.borrow_and_update();
        }
    }

    /// Apply shared values published since the last sync. Returns whether
    /// any parameter changed.
    pub fn sync_globals(&mut self) -> bool {
        if !self.updates.has_changed().unwrap_or(false) {
            return false;
        }

        let shared = self.updates.borrow_and_update().clone();
        let mut changed = false;

        for (name, value) in shared.iter() {
            for (location, params) in [
                (ParameterLocation::Path, &mut self.path_params),
                (ParameterLocation::Query, &mut self.query_params),
            ] {
                if self.endpoint.declares(location, name)
                    && params.get(name).map(String::as_str) != Some(value)
                {
                    params.insert(name.to_string(), value.to_string());
                    changed = true;
                }
            }
        }

        changed
    }

    /// URL preview against `base_url`; unfilled placeholders stay visible.
    pub fn url(&self, base_url: &str) -> String {
        build_url(base_url, &self.endpoint.path, &self.path_params, &self.query_params)
    }

    pub fn can_send(&self) -> bool {
        can_send_request(&self.endpoint, &self.path_params, &self.query_params)
    }

    /// The proxied request for the current values, refused while required
    /// parameters are unfilled.
    pub fn prepare(
        &self,
        builder: &ProxyRequestBuilder,
        base_url: &str,
        body: Option<&Value>,
    ) -> Result<ProxiedRequest> {
        if !self.can_send() {
            return Err(ClientError::MissingRequiredParameters(self.endpoint.id.clone()));
        }

        let url = self.url(base_url);
        builder.build_for_endpoint(&self.endpoint.id, self.endpoint.method, &url, body)
    }
}
