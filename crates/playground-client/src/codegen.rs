//! Copy-paste code samples for a request.
//!
//! Pure string templating; nothing here touches the network.

use playground_openapi::{HttpMethod, KnownEndpoint};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Placeholder shown instead of a real key in rendered samples.
pub const CODE_SAMPLE_API_KEY: &str = "YOUR_API_KEY";

/// Credential type used by the SDK snippet for unknown endpoints.
pub const DEFAULT_SDK_CREDENTIAL_TYPE: &str = "kyc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Curl,
    JavaScript,
    Python,
    /// Human ID SDK, offered for Individual Verification endpoints
    Sdk,
}

impl CodeLanguage {
    pub const ALL: [CodeLanguage; 4] = [
        CodeLanguage::Curl,
        CodeLanguage::JavaScript,
        CodeLanguage::Python,
        CodeLanguage::Sdk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeLanguage::Curl => "curl",
            CodeLanguage::JavaScript => "javascript",
            CodeLanguage::Python => "python",
            CodeLanguage::Sdk => "sdk",
        }
    }
}

impl fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unsupported code language: {}", s))
    }
}

/// Inputs shared by every template.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeSampleParams {
    pub method: HttpMethod,
    pub url: String,
    /// Empty omits the key header
    pub api_key: String,
    pub body: Option<Value>,
}

impl CodeSampleParams {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            api_key: CODE_SAMPLE_API_KEY.to_string(),
            body: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The body, unless it is absent or an empty object.
    fn sample_body(&self) -> Option<&Value> {
        match &self.body {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(body) => Some(body),
        }
    }

    fn headers(&self) -> Value {
        let mut headers = Map::new();
        headers.insert("Content-Type".to_string(), Value::from("application/json"));
        if !self.api_key.is_empty() {
            headers.insert("X-API-Key".to_string(), Value::from(self.api_key.as_str()));
        }
        Value::Object(headers)
    }
}

/// Render `params` in `language`. `endpoint_id` only matters for the SDK snippet.
pub fn generate(
    language: CodeLanguage,
    params: &CodeSampleParams,
    endpoint_id: Option<&str>,
) -> String {
    match language {
        CodeLanguage::Curl => curl(params),
        CodeLanguage::JavaScript => javascript(params),
        CodeLanguage::Python => python(params),
        CodeLanguage::Sdk => sdk(endpoint_id.unwrap_or_default(), &params.url),
    }
}

/// SDK credential type for an endpoint id.
pub fn sdk_credential_type(endpoint_id: &str) -> &'static str {
    KnownEndpoint::from_id(endpoint_id)
        .and_then(|known| known.sdk_credential_type())
        .unwrap_or(DEFAULT_SDK_CREDENTIAL_TYPE)
}

fn curl(params: &CodeSampleParams) -> String {
    let mut lines = vec![format!("curl -X {} \"{}\"", params.method, params.url)];

    if !params.api_key.is_empty() {
        lines.push(format!("  -H \"X-API-Key: {}\"", params.api_key));
    }
    lines.push("  -H \"Content-Type: application/json\"".to_string());

    if let Some(body) = params.sample_body() {
        lines.push(format!("  -d '{}'", pretty(body, 2)));
    }

    lines.join(" \\\n")
}

fn javascript(params: &CodeSampleParams) -> String {
    let body = params.sample_body();
    let mut code = String::new();

    if let Some(body) = body {
        code.push_str(&format!("const body = {};\n\n", pretty(body, 2)));
    }

    code.push_str(&format!(
        "const response = await fetch(\"{}\", {{\n  method: \"{}\",\n  headers: {},",
        params.url,
        params.method,
        pretty(&params.headers(), 4).replace('\n', "\n  ")
    ));

    if body.is_some() {
        code.push_str("\n  body: JSON.stringify(body),");
    }

    code.push_str("\n});\n\nconst data = await response.json();\nconsole.log(data);");
    code
}

fn python(params: &CodeSampleParams) -> String {
    let method = params.method.as_str().to_lowercase();
    let mut code = format!(
        "import requests\n\nurl = \"{}\"\nheaders = {}\n",
        params.url,
        pretty(&params.headers(), 4).replace('"', "'")
    );

    match params.sample_body() {
        Some(body) => {
            code.push_str(&format!("\nbody = {}\n", pretty(body, 4)));
            code.push_str(&format!(
                "\nresponse = requests.{}(url, headers=headers, json=body)",
                method
            ));
        }
        None => {
            code.push_str(&format!("\nresponse = requests.{}(url, headers=headers)", method));
        }
    }

    code.push_str("\n\nprint(response.json())");
    code
}

fn sdk(endpoint_id: &str, url: &str) -> String {
    format!(
        r#"// Install: npm install @holonym-foundation/human-id-sdk

import {{ humanID }} from '@holonym-foundation/human-id-sdk';

// Step 1: Prompt user to complete verification
// This opens the Human ID verification flow
await humanID.requestSBT('{credential}'); // 'kyc' | 'phone' | 'biometrics' | 'clean-hands'

// Step 2: Check verification status via API
const resp = await fetch(
  '{url}'
);
const {{ result: isVerified }} = await resp.json();"#,
        credential = sdk_credential_type(endpoint_id),
        url = url,
    )
}

/// JSON with the given indent width.
fn pretty(value: &Value, indent: usize) -> String {
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);

    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://api.passport.xyz/v2/stamps/335/score/0xabc";

    #[test]
    fn test_curl_without_body() {
        let code = generate(CodeLanguage::Curl, &CodeSampleParams::new(HttpMethod::Get, URL), None);
        assert_eq!(
            code,
            "curl -X GET \"https://api.passport.xyz/v2/stamps/335/score/0xabc\" \\\n  -H \"X-API-Key: YOUR_API_KEY\" \\\n  -H \"Content-Type: application/json\""
        );
    }

    #[test]
    fn test_curl_with_body_and_no_key() {
        let params = CodeSampleParams::new(HttpMethod::Post, "https://h/p")
            .with_api_key("")
            .with_body(json!({"a": 1}));
        let code = generate(CodeLanguage::Curl, &params, None);
        assert_eq!(
            code,
            "curl -X POST \"https://h/p\" \\\n  -H \"Content-Type: application/json\" \\\n  -d '{\n  \"a\": 1\n}'"
        );
    }

    #[test]
    fn test_empty_body_object_is_omitted() {
        let params = CodeSampleParams::new(HttpMethod::Post, "https://h/p").with_body(json!({}));
        assert!(!generate(CodeLanguage::Curl, &params, None).contains("-d"));
        assert!(!generate(CodeLanguage::JavaScript, &params, None).contains("body"));
        assert!(!generate(CodeLanguage::Python, &params, None).contains("json=body"));
    }

    #[test]
    fn test_javascript() {
        let params = CodeSampleParams::new(HttpMethod::Get, URL);
        let code = generate(CodeLanguage::JavaScript, &params, None);
        let expected = "const response = await fetch(\"https://api.passport.xyz/v2/stamps/335/score/0xabc\", {\n  method: \"GET\",\n  headers: {\n      \"Content-Type\": \"application/json\",\n      \"X-API-Key\": \"YOUR_API_KEY\"\n  },\n});\n\nconst data = await response.json();\nconsole.log(data);";
        assert_eq!(code, expected);
    }

    #[test]
    fn test_javascript_with_body() {
        let params = CodeSampleParams::new(HttpMethod::Post, "https://h/p")
            .with_api_key("")
            .with_body(json!({"a": 1}));
        let code = generate(CodeLanguage::JavaScript, &params, None);
        assert!(code.starts_with("const body = {\n  \"a\": 1\n};\n\n"));
        assert!(code.contains("\n  body: JSON.stringify(body),\n});"));
        assert!(!code.contains("X-API-Key"));
    }

    #[test]
    fn test_python() {
        let params = CodeSampleParams::new(HttpMethod::Get, URL);
        let code = generate(CodeLanguage::Python, &params, None);
        let expected = "import requests\n\nurl = \"https://api.passport.xyz/v2/stamps/335/score/0xabc\"\nheaders = {\n    'Content-Type': 'application/json',\n    'X-API-Key': 'YOUR_API_KEY'\n}\n\nresponse = requests.get(url, headers=headers)\n\nprint(response.json())";
        assert_eq!(code, expected);
    }

    #[test]
    fn test_python_with_body() {
        let params = CodeSampleParams::new(HttpMethod::Put, "https://h/p").with_body(json!({"a": 1}));
        let code = generate(CodeLanguage::Python, &params, None);
        assert!(code.contains("\nbody = {\n    \"a\": 1\n}\n"));
        assert!(code.contains("response = requests.put(url, headers=headers, json=body)"));
    }

    #[test]
    fn test_sdk_credential_types() {
        assert_eq!(sdk_credential_type("iv_gov_id_verification"), "kyc");
        assert_eq!(sdk_credential_type("iv_phone_verification"), "phone");
        assert_eq!(sdk_credential_type("iv_biometrics_verification"), "biometrics");
        assert_eq!(sdk_credential_type("iv_clean_hands"), "clean-hands");
        assert_eq!(sdk_credential_type("v2_api_api_models_get_analysis"), "kyc");
        assert_eq!(sdk_credential_type(""), "kyc");
    }

    #[test]
    fn test_sdk_snippet() {
        let url = "https://api.holonym.io/sybil-resistance/phone/optimism?user=0x1&action-id=123456789";
        let params = CodeSampleParams::new(HttpMethod::Get, url).with_api_key("");

        let code = generate(CodeLanguage::Sdk, &params, Some("iv_phone_verification"));
        assert!(code.contains("await humanID.requestSBT('phone');"));
        assert!(code.contains(&format!("  '{}'\n);", url)));

        let fallback = generate(CodeLanguage::Sdk, &params, None);
        assert!(fallback.contains("requestSBT('kyc')"));
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("JavaScript".parse::<CodeLanguage>().unwrap(), CodeLanguage::JavaScript);
        assert_eq!("curl".parse::<CodeLanguage>().unwrap(), CodeLanguage::Curl);
        assert!("ruby".parse::<CodeLanguage>().is_err());
    }
}
