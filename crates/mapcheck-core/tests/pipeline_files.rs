mod support;

use std::fs;

use wiremock::matchers::query_param;
use wiremock::{MockServer, ResponseTemplate};

use mapcheck_core::pipeline::annotate_files;
use mapcheck_core::{ConceptMapSelection, Error};
use support::*;

const OUTPUT_HEADER: &str = "source_code,target_code,source_display,target_display,mapping_valid\n";

#[tokio::test]
async fn annotates_a_valid_mapping() {
    let server = MockServer::start().await;
    validate_code()
        .respond_with(valid_code("Headache"))
        .expect(2)
        .mount(&server)
        .await;
    translate()
        .and(query_param("url", CONCEPT_MAP))
        .and(query_param("reverse", "true"))
        .respond_with(translation(&[(ICD10CM, "R51.9")]))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tmp dir");
    let input = dir.path().join("input.csv");
    let output = dir.path().join("output.csv");
    fs::write(&input, "source_code,target_code\nR51,R51.9\n").unwrap();

    let verifier = verifier(&server, ConceptMapSelection::Explicit(CONCEPT_MAP.into()));
    let mut seen = Vec::new();
    let rows = annotate_files(&verifier, &input, &output, |n, record| {
        seen.push((n, record.source_code.clone()));
    })
    .await
    .unwrap();

    assert_eq!(rows, 1);
    assert_eq!(seen, vec![(1, "R51".to_string())]);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        format!("{OUTPUT_HEADER}R51,R51.9,Headache,Headache,True\n")
    );
}

#[tokio::test]
async fn unknown_codes_leave_display_empty() {
    let server = MockServer::start().await;
    validate_code()
        .respond_with(unknown_code())
        .mount(&server)
        .await;
    translate()
        .respond_with(no_translation())
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tmp dir");
    let input = dir.path().join("input.csv");
    let output = dir.path().join("output.csv");
    fs::write(&input, "\u{feff}source_code,target_code\nXX1,YY1\nXX2,YY2\n").unwrap();

    let verifier = verifier(&server, ConceptMapSelection::ServerDefault);
    let rows = annotate_files(&verifier, &input, &output, |_, _| {})
        .await
        .unwrap();

    assert_eq!(rows, 2);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        format!("{OUTPUT_HEADER}XX1,YY1,,,False\nXX2,YY2,,,False\n")
    );
}

#[tokio::test]
async fn bad_header_fails_before_any_request_or_output() {
    let server = MockServer::start().await;
    validate_code()
        .respond_with(valid_code("Headache"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tmp dir");
    let input = dir.path().join("input.csv");
    let output = dir.path().join("output.csv");
    fs::write(&input, "code,target\nR51,R51.9\n").unwrap();

    let verifier = verifier(&server, ConceptMapSelection::ServerDefault);
    let err = annotate_files(&verifier, &input, &output, |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidHeader { .. }));
    assert!(!output.exists());
}

#[tokio::test]
async fn server_error_keeps_rows_already_written() {
    let server = MockServer::start().await;
    validate_code()
        .and(query_param("code", "BAD"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    validate_code()
        .respond_with(valid_code("Fever"))
        .mount(&server)
        .await;
    translate()
        .respond_with(translation(&[(ICD10CM, "R50.9")]))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tmp dir");
    let input = dir.path().join("input.csv");
    let output = dir.path().join("output.csv");
    fs::write(
        &input,
        "source_code,target_code\nR50,R50.9\nBAD,R51.9\nR52,R52.9\n",
    )
    .unwrap();

    let verifier = verifier(&server, ConceptMapSelection::ServerDefault);
    let mut seen = Vec::new();
    let err = annotate_files(&verifier, &input, &output, |n, _| seen.push(n))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Http { .. }));
    // the third row is never started
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        format!("{OUTPUT_HEADER}R50,R50.9,Fever,Fever,True\n")
    );
}

#[tokio::test]
async fn missing_input_is_an_io_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tmp dir");

    let verifier = verifier(&server, ConceptMapSelection::ServerDefault);
    let err = annotate_files(
        &verifier,
        &dir.path().join("missing.csv"),
        &dir.path().join("out.csv"),
        |_, _| {},
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
