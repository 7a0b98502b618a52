use serde_json::Value;

use crate::parameters::Parameters;
use crate::{Error, Result};

/// Client for the terminology operations of a FHIR server.
///
/// A single `reqwest::Client` is kept for the lifetime of the run so every
/// request reuses the same connection pool.
pub struct TerminologyClient {
    http: reqwest::Client,
    base_url: String,
}

impl TerminologyClient {
    /// `verify_tls = false` accepts any server certificate. Only meant for
    /// internal servers with self-signed certificates.
    pub fn new(base_url: &str, verify_tls: bool) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !verify_tls {
            tracing::debug!(%base_url, "TLS certificate verification disabled");
        }
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|source| Error::Transport {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn operation_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// `CodeSystem/$validate-code` for `code` in `system` (and `version`, if given).
    pub async fn validate_code(
        &self,
        system: &str,
        version: Option<&str>,
        code: &str,
    ) -> Result<Parameters> {
        let params = query(&[
            ("url", Some(system)),
            ("version", version),
            ("code", Some(code)),
        ]);
        self.get("CodeSystem/$validate-code", &params).await
    }

    /// `ConceptMap/$translate` for `code` from `system` towards `target_system`.
    ///
    /// Without `map_url` the server picks the concept map itself. `reverse` is
    /// only sent when true.
    pub async fn translate(
        &self,
        map_url: Option<&str>,
        system: &str,
        code: &str,
        target_system: &str,
        reverse: bool,
    ) -> Result<Parameters> {
        let params = query(&[
            ("url", map_url),
            ("system", Some(system)),
            ("code", Some(code)),
            ("target", Some(target_system)),
            ("reverse", reverse.then_some("true")),
        ]);
        self.get("ConceptMap/$translate", &params).await
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Parameters> {
        let url = self.operation_url(path);
        tracing::debug!(%url, ?params, "GET");
        let resp = self
            .http
            .get(&url)
            .query(params)
            .header("Accept", "application/fhir+json")
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.clone(),
                source,
            })?;
        let body = handle_response(&url, resp).await?;
        Parameters::from_resource(body)
    }
}

/// Drop parameters without a value; an absent parameter is never sent empty.
fn query<'a>(params: &[(&'a str, Option<&'a str>)]) -> Vec<(&'a str, &'a str)> {
    params
        .iter()
        .filter_map(|(key, value)| value.map(|v| (*key, v)))
        .collect()
}

async fn handle_response(url: &str, resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body = resp.text().await.map_err(|source| Error::Transport {
        url: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        let message = operation_outcome_diagnostics(&body).unwrap_or(body);
        return Err(Error::Http {
            status,
            url: url.to_string(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|source| Error::InvalidJson {
        url: url.to_string(),
        source,
    })
}

fn operation_outcome_diagnostics(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    if json.get("resourceType").and_then(Value::as_str) != Some("OperationOutcome") {
        return None;
    }
    let msgs: Vec<&str> = json
        .get("issue")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|i| i.get("diagnostics").and_then(Value::as_str))
        .collect();
    (!msgs.is_empty()).then(|| msgs.join("; "))
}
