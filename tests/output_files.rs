mod common;

use skinprick_report::{ReportConfig, ReportRequest, generate_report};

#[test]
fn saved_report_is_named_after_the_patient() {
    let out_dir = common::output_dir();
    let path = generate_report(
        &common::jane_doe_request(),
        "No adverse reaction observed.",
        &ReportConfig::default(),
        &out_dir,
    )
    .expect("report saves");

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("Jane Doe_allergy_test.pdf")
    );
    let bytes = std::fs::read(&path).expect("written file readable");
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(common::has_string(&bytes, "Patient Name: Jane Doe"));
}

#[test]
fn missing_patient_name_falls_back_to_generic_stem() {
    let out_dir = common::output_dir();
    let path = generate_report(
        &ReportRequest::default(),
        "",
        &ReportConfig::default(),
        &out_dir,
    )
    .expect("report saves");

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("report_allergy_test.pdf")
    );
}

#[test]
fn saving_into_a_missing_directory_is_an_io_error() {
    let missing = common::output_dir().join("no-such-subdir");
    let result = generate_report(
        &common::jane_doe_request(),
        "",
        &ReportConfig::default(),
        &missing,
    );
    assert!(matches!(result, Err(skinprick_report::Error::Io(_))));
}
