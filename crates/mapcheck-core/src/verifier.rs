//! Verification of a single source/target code pair against the terminology
//! server.

use crate::Result;
use crate::client::TerminologyClient;
use crate::config::{CodeSystemRef, ConceptMapSelection, MappingConfig};
use crate::parameters::Coding;

/// One input row: a source code and the target code it is claimed to map to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    pub source_code: String,
    pub target_code: String,
}

/// A [`MappingRecord`] annotated with what the server knows about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedMapping {
    pub source_code: String,
    pub target_code: String,
    pub source_display: Option<String>,
    pub target_display: Option<String>,
    pub mapping_valid: bool,
}

/// Display text of `code`, or `None` when the server does not know the code.
///
/// A server that reports the code as valid but sends no display is treated as
/// broken and the lookup fails.
pub async fn resolve_display(
    client: &TerminologyClient,
    system: &str,
    version: Option<&str>,
    code: &str,
) -> Result<Option<String>> {
    let response = client.validate_code(system, version, code).await?;
    if response.get_boolean("result")? {
        Ok(Some(response.get_string("display")?))
    } else {
        tracing::debug!(system, code, "code not valid in code system");
        Ok(None)
    }
}

/// Whether the server holds a mapping between `code_a` in `system_a` and
/// exactly `code_b` in `system_b`.
///
/// A `result` of true is not enough on its own: the server may have searched
/// more broadly and matched concepts in other systems, so at least one match
/// must carry the requested system and code.
pub async fn mapping_is_valid(
    client: &TerminologyClient,
    concept_map: &ConceptMapSelection,
    system_a: &str,
    code_a: &str,
    system_b: &str,
    code_b: &str,
) -> Result<bool> {
    let response = client
        .translate(concept_map.url(), system_a, code_a, system_b, true)
        .await?;
    if !response.get_boolean("result")? {
        return Ok(false);
    }

    let concepts = response
        .get_parts("match")
        .map(|part| part.and_then(|p| p.get_coding("concept")))
        .collect::<Result<Vec<Coding>>>()?;
    let valid = concepts.iter().any(|c| c.is(system_b, code_b));
    tracing::debug!(
        code_a,
        code_b,
        matches = concepts.len(),
        valid,
        "translate result"
    );
    Ok(valid)
}

/// Runs the three lookups for each row with a fixed mapping configuration.
pub struct MappingVerifier {
    client: TerminologyClient,
    mapping: MappingConfig,
}

impl MappingVerifier {
    pub fn new(client: TerminologyClient, mapping: MappingConfig) -> Self {
        Self { client, mapping }
    }

    async fn display(&self, system: &CodeSystemRef, code: &str) -> Result<Option<String>> {
        resolve_display(&self.client, &system.url, system.version.as_deref(), code).await
    }

    /// Source display, target display, then the translate check, in that order.
    pub async fn verify(&self, record: &MappingRecord) -> Result<AnnotatedMapping> {
        let source_display = self.display(&self.mapping.source, &record.source_code).await?;
        let target_display = self.display(&self.mapping.target, &record.target_code).await?;
        let mapping_valid = mapping_is_valid(
            &self.client,
            &self.mapping.concept_map,
            &self.mapping.source.url,
            &record.source_code,
            &self.mapping.target.url,
            &record.target_code,
        )
        .await?;

        Ok(AnnotatedMapping {
            source_code: record.source_code.clone(),
            target_code: record.target_code.clone(),
            source_display,
            target_display,
            mapping_valid,
        })
    }
}
