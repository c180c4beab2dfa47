//! OpenAPI specification parser.
//!
//! Walks the path/method table of an OpenAPI v3 document and produces the
//! flat list of [`ParsedEndpoint`]s the playground renders, then merges in the
//! statically declared Individual Verification endpoints.

use crate::error::{OpenApiError, Result};
use crate::individual::individual_verification_endpoints;
use crate::types::{HttpMethod, Parameter, ParameterLocation, ParameterSchema, ParsedEndpoint};
use openapiv3::{OpenAPI, Operation, ParameterSchemaOrContent, PathItem, ReferenceOr};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Base URL used when the document declares no servers.
pub const DEFAULT_BASE_URL: &str = "https://api.passport.xyz";

/// Tag assigned to operations that declare none.
pub const DEFAULT_TAG: &str = "General";

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Parser for OpenAPI specifications.
pub struct OpenApiParser {
    spec: OpenAPI,
}

impl OpenApiParser {
    pub fn new(spec: OpenAPI) -> Self {
        Self { spec }
    }

    /// Parse an OpenAPI spec from a string.
    ///
    /// Automatically detects JSON or YAML format.
    pub fn from_str(content: &str) -> Result<Self> {
        // Try JSON first
        let spec = serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| OpenApiError::ParseError(e.to_string()))?;

        Ok(Self { spec })
    }

    pub fn spec(&self) -> &OpenAPI {
        &self.spec
    }

    pub fn into_spec(self) -> OpenAPI {
        self.spec
    }

    /// First declared server URL, falling back to the Passport API.
    pub fn base_url(&self) -> String {
        self.spec
            .servers
            .first()
            .map(|s| s.url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Parse the document and append the Individual Verification endpoints.
    ///
    /// Endpoint ids must stay unique across the merged list.
    pub fn normalize(&self) -> Result<Vec<ParsedEndpoint>> {
        let mut endpoints = self.parse()?;
        endpoints.extend(individual_verification_endpoints());

        let mut seen = HashSet::new();
        for endpoint in &endpoints {
            if !seen.insert(endpoint.id.as_str()) {
                return Err(OpenApiError::DuplicateEndpoint(endpoint.id.clone()));
            }
        }

        Ok(endpoints)
    }

    /// Parse the document's own operations, in document order.
    pub fn parse(&self) -> Result<Vec<ParsedEndpoint>> {
        let mut endpoints = Vec::new();

        for (path, path_item_ref) in &self.spec.paths.paths {
            let path_item = match path_item_ref {
                ReferenceOr::Item(item) => item,
                ReferenceOr::Reference { .. } => {
                    warn!("Path references not yet supported: {}", path);
                    continue;
                }
            };

            for method in HttpMethod::ALL {
                if let Some(operation) = operation_for(path_item, method) {
                    endpoints.push(self.parse_operation(operation, path, method, path_item));
                }
            }
        }

        debug!("Parsed {} endpoints", endpoints.len());
        Ok(endpoints)
    }

    fn parse_operation(
        &self,
        operation: &Operation,
        path: &str,
        method: HttpMethod,
        path_item: &PathItem,
    ) -> ParsedEndpoint {
        let id = operation
            .operation_id
            .clone()
            .unwrap_or_else(|| generate_operation_id(path, method));

        // Path-level parameters first, overridden by operation-level ones
        let mut parameters: Vec<Parameter> = Vec::new();
        for param_ref in path_item.parameters.iter().chain(&operation.parameters) {
            let param = match param_ref {
                ReferenceOr::Item(p) => p,
                ReferenceOr::Reference { reference } => {
                    warn!("Parameter references not yet supported: {}", reference);
                    continue;
                }
            };

            let Some(parsed) = parse_parameter(param) else {
                continue;
            };

            match parameters
                .iter_mut()
                .find(|p| p.name == parsed.name && p.location == parsed.location)
            {
                Some(existing) => *existing = parsed,
                None => parameters.push(parsed),
            }
        }

        let request_body = operation.request_body.as_ref().and_then(|body_ref| match body_ref {
            ReferenceOr::Item(body) => body
                .content
                .get("application/json")
                .or_else(|| body.content.values().next())
                .and_then(|media| media.schema.as_ref())
                .and_then(|schema| serde_json::to_value(schema).ok()),
            ReferenceOr::Reference { .. } => {
                warn!("RequestBody references not yet supported");
                None
            }
        });

        ParsedEndpoint {
            id,
            method,
            path: path.to_string(),
            summary: operation.summary.clone().unwrap_or_default(),
            description: strip_html_tags(operation.description.as_deref().unwrap_or_default()),
            tag: operation
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_TAG.to_string()),
            parameters,
            request_body,
            requires_auth: requires_auth(operation),
        }
    }

    /// Follow a `#/components/schemas/<name>` reference.
    ///
    /// Anything that is not a reference is returned unchanged.
    pub fn resolve_schema(&self, schema: &Value) -> Option<Value> {
        let Some(reference) = schema.get("$ref").and_then(Value::as_str) else {
            return Some(schema.clone());
        };

        let name = reference.strip_prefix(SCHEMA_REF_PREFIX)?;
        self.spec
            .components
            .as_ref()?
            .schemas
            .get(name)
            .and_then(|s| serde_json::to_value(s).ok())
    }
}

fn operation_for(path_item: &PathItem, method: HttpMethod) -> Option<&Operation> {
    match method {
        HttpMethod::Get => path_item.get.as_ref(),
        HttpMethod::Post => path_item.post.as_ref(),
        HttpMethod::Put => path_item.put.as_ref(),
        HttpMethod::Delete => path_item.delete.as_ref(),
        HttpMethod::Patch => path_item.patch.as_ref(),
    }
}

fn parse_parameter(param: &openapiv3::Parameter) -> Option<Parameter> {
    let (data, location) = match param {
        openapiv3::Parameter::Query { parameter_data, .. } => {
            (parameter_data, ParameterLocation::Query)
        }
        openapiv3::Parameter::Header { parameter_data, .. } => {
            (parameter_data, ParameterLocation::Header)
        }
        openapiv3::Parameter::Path { parameter_data, .. } => {
            (parameter_data, ParameterLocation::Path)
        }
        openapiv3::Parameter::Cookie { parameter_data, .. } => {
            (parameter_data, ParameterLocation::Cookie)
        }
    };

    let schema = match &data.format {
        ParameterSchemaOrContent::Schema(ReferenceOr::Item(schema)) => serde_json::to_value(schema)
            .map(|v| ParameterSchema::from_json(&v))
            .unwrap_or_default(),
        ParameterSchemaOrContent::Schema(ReferenceOr::Reference { .. }) => {
            debug!("Schema reference on parameter '{}' left untyped", data.name);
            ParameterSchema::default()
        }
        ParameterSchemaOrContent::Content(_) => {
            warn!("Parameter content not yet supported: {}", data.name);
            return None;
        }
    };

    Some(Parameter {
        name: data.name.clone(),
        location,
        description: data.description.clone(),
        required: data.required,
        schema,
    })
}

/// True iff some security requirement names at least one scheme.
///
/// An empty requirement object (`security: [{}]`) means "no auth needed".
fn requires_auth(operation: &Operation) -> bool {
    operation
        .security
        .as_ref()
        .is_some_and(|requirements| requirements.iter().any(|req| !req.is_empty()))
}

/// Operation id for operations that declare none, e.g. `get-/v2/models`.
fn generate_operation_id(path: &str, method: HttpMethod) -> String {
    format!("{}-{}", method.as_str().to_lowercase(), path)
}

/// Remove HTML tags and decode the common entities.
pub fn strip_html_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        match rest[start..].find('>') {
            Some(end) => {
                text.push_str(&rest[..start]);
                rest = &rest[start + end + 1..];
            }
            None => break,
        }
    }
    text.push_str(rest);

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
