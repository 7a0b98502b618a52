use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use mapcheck_core::pipeline::annotate_files;
use mapcheck_core::{ConceptMapSelection, Error, MappingVerifier, TerminologyClient};

use crate::cli::RunPlan;
use crate::output::{print_progress, print_success};

pub async fn run(plan: RunPlan) -> Result<()> {
    let RunPlan {
        config,
        input,
        output,
    } = plan;

    tracing::info!(
        server = %config.server_url,
        source = %config.mapping.source.url,
        target = %config.mapping.target.url,
        concept_map = config.mapping.concept_map.url().unwrap_or("(server default)"),
        "starting mapping verification"
    );
    if config.mapping.concept_map == ConceptMapSelection::ServerDefault {
        tracing::debug!("no concept map configured, server selects one per system pair");
    }

    let client = TerminologyClient::new(&config.server_url, config.verify_tls)?;
    let verifier = MappingVerifier::new(client, config.mapping);

    let rows = annotate_files(&verifier, &input, &output, |row, _| print_progress(row))
        .await
        .map_err(|e| {
            let msg = failure_context(&e, &input, &output);
            anyhow::Error::new(e).context(msg)
        })?;

    print_success(&format!(
        "Annotated {rows} mapping(s) into {}",
        output.display().to_string().cyan()
    ));
    Ok(())
}

/// Names the file a failed run is about: the input or output file that could
/// not be opened, or the partial output once rows have been processed.
fn failure_context(err: &Error, input: &Path, output: &Path) -> String {
    match err {
        Error::Io { path, .. } if path == output => {
            format!("Failed to create output {}", output.display())
        }
        Error::Io { .. } | Error::InvalidHeader { .. } => {
            format!("Failed to annotate {}", input.display())
        }
        _ => format!(
            "Stopped on a failed row; completed rows are in {}",
            output.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_failure_context_names_the_failing_file() {
        let input = Path::new("in.csv");
        let output = Path::new("out/annotated.csv");

        let create_failed = Error::io(output, io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(
            failure_context(&create_failed, input, output),
            "Failed to create output out/annotated.csv"
        );

        let open_failed = Error::io(input, io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(
            failure_context(&open_failed, input, output),
            "Failed to annotate in.csv"
        );

        let bad_header = Error::InvalidHeader {
            found: vec!["code".into(), "target".into()],
        };
        assert_eq!(
            failure_context(&bad_header, input, output),
            "Failed to annotate in.csv"
        );

        let missing = Error::parameter_not_found("display", "valueString");
        assert_eq!(
            failure_context(&missing, input, output),
            "Stopped on a failed row; completed rows are in out/annotated.csv"
        );
    }
}
