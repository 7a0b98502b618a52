#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockBuilder, MockServer, Request, ResponseTemplate};

use mapcheck_core::{
    CodeSystemRef, ConceptMapSelection, MappingConfig, MappingVerifier, TerminologyClient,
};

pub const ICD10: &str = "http://hl7.org/fhir/sid/icd-10";
pub const ICD10CM: &str = "http://hl7.org/fhir/sid/icd-10-cm";
pub const CONCEPT_MAP: &str = "http://example.org/fhir/ConceptMap/icd10-to-icd10cm";

pub const VALIDATE_CODE: &str = "/CodeSystem/$validate-code";
pub const TRANSLATE: &str = "/ConceptMap/$translate";

pub fn validate_code() -> MockBuilder {
    Mock::given(method("GET")).and(path(VALIDATE_CODE))
}

pub fn translate() -> MockBuilder {
    Mock::given(method("GET")).and(path(TRANSLATE))
}

/// Matches requests that do not carry query parameter `key` at all.
pub fn without_query_param(key: &'static str) -> impl Fn(&Request) -> bool + Send + Sync {
    move |req: &Request| !req.url.query_pairs().any(|(k, _)| k == key)
}

pub fn parameters(entries: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "resourceType": "Parameters",
        "parameter": entries
    }))
}

pub fn valid_code(display: &str) -> ResponseTemplate {
    parameters(json!([
        { "name": "result", "valueBoolean": true },
        { "name": "display", "valueString": display }
    ]))
}

pub fn unknown_code() -> ResponseTemplate {
    parameters(json!([
        { "name": "result", "valueBoolean": false },
        { "name": "message", "valueString": "Unknown code" }
    ]))
}

/// A successful `$translate` answer with one match per `(system, code)`.
pub fn translation(matches: &[(&str, &str)]) -> ResponseTemplate {
    let mut entries = vec![json!({ "name": "result", "valueBoolean": true })];
    entries.extend(matches.iter().map(|(system, code)| {
        json!({
            "name": "match",
            "part": [
                { "name": "equivalence", "valueCode": "equivalent" },
                { "name": "concept", "valueCoding": { "system": system, "code": code } }
            ]
        })
    }));
    parameters(Value::Array(entries))
}

pub fn no_translation() -> ResponseTemplate {
    parameters(json!([
        { "name": "result", "valueBoolean": false },
        { "name": "message", "valueString": "No mappings found" }
    ]))
}

pub fn client(server: &MockServer) -> TerminologyClient {
    TerminologyClient::new(&server.uri(), true).expect("client")
}

pub fn mapping(concept_map: ConceptMapSelection) -> MappingConfig {
    MappingConfig {
        source: CodeSystemRef::new(ICD10, Some("2019".into())),
        target: CodeSystemRef::new(ICD10CM, None),
        concept_map,
    }
}

pub fn verifier(server: &MockServer, concept_map: ConceptMapSelection) -> MappingVerifier {
    MappingVerifier::new(client(server), mapping(concept_map))
}
