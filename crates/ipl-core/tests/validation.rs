use ipl_core::{
    Diagnostic, DiagnosticRange, DiagnosticSeverity, IplError, LintConfig, LintDebounce,
    validate, validate_with,
};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

fn summary(diagnostics: &[Diagnostic]) -> Vec<(usize, DiagnosticSeverity, &'static str)> {
    diagnostics
        .iter()
        .map(|d| (d.line, d.severity, d.code))
        .collect()
}

#[test]
fn test_every_rule_fires_in_one_document() {
    let doc = "\
schema acl
entity folder_item {
  attributes {
    DisplayName: Text
  }
  relations {
    ParentFolder: ghost
  }
  permissions {
    canView: owner;;
  }
\t}}
";
    let result = validate(doc);
    assert_eq!(
        summary(&result.diagnostics),
        vec![
            (0, DiagnosticSeverity::Error, "schema-header"),
            (1, DiagnosticSeverity::Warning, "entity-pascal-case"),
            (3, DiagnosticSeverity::Warning, "attribute-snake-case"),
            (3, DiagnosticSeverity::Error, "unknown-type"),
            (6, DiagnosticSeverity::Warning, "relation-snake-case"),
            (6, DiagnosticSeverity::Info, "unknown-reference"),
            (9, DiagnosticSeverity::Warning, "permission-snake-case"),
            (9, DiagnosticSeverity::Error, "double-semicolon"),
            (11, DiagnosticSeverity::Info, "tab-indentation"),
            (12, DiagnosticSeverity::Error, "unbalanced-braces"),
        ]
    );
    assert_eq!(result.error_count(), 4);
    assert_eq!(result.warning_count(), 4);
    assert_eq!(result.info_count(), 2);
    assert!(!result.valid);
}

#[test]
fn test_diagnostic_ranges_point_at_offending_text() {
    let doc = "entity A {\n  relations {\n    viewer: nobody\n  }\n}";
    let result = validate(doc);
    assert_eq!(result.diagnostics.len(), 1);
    let d = &result.diagnostics[0];
    let text: String = doc
        .chars()
        .skip(d.range.start)
        .take(d.range.end - d.range.start)
        .collect();
    assert_eq!(text, "nobody");
    assert_eq!(Diagnostic::SOURCE, "IPL");
}

#[test]
fn test_warnings_and_infos_do_not_block_save() {
    let doc = "entity lower {\n\tattributes {\n    BadName: String\n  }\n}";
    let result = validate(doc);
    assert!(result.valid);
    assert!(result.error_count() == 0 && !result.diagnostics.is_empty());
    assert!(result.ensure_savable().is_ok());
}

#[test]
fn test_save_gate_reports_error_count() {
    let result = validate("entity A {");
    let err = result.ensure_savable().unwrap_err();
    assert!(matches!(err, IplError::InvalidDocument { errors: 1 }));
    assert_eq!(
        err.to_string(),
        "document has 1 error diagnostic(s) and cannot be saved"
    );
}

#[test]
fn test_trailing_comment_still_reports_unbalanced_braces() {
    let doc = "entity A {\n# done";
    let result = validate(doc);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].line, 1);
    let end = doc.chars().count();
    assert_eq!(result.diagnostics[0].range, DiagnosticRange::new(end, end));
}

#[test]
fn test_methods_block_is_not_checked() {
    let doc = "entity A {\n  methods {\n    DoThing: Whatever\n  }\n}";
    assert!(validate(doc).diagnostics.is_empty());
}

#[test]
fn test_diagnostics_serialize_for_host() {
    let result = validate("entity a {}");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["diagnostics"][0]["severity"], "warning");
    assert_eq!(json["diagnostics"][0]["code"], "entity-pascal-case");
}

#[test]
fn test_debounced_lint_loop() {
    let config = LintConfig::from_json(r#"{ "delayMs": 200, "reportTabs": false }"#).unwrap();
    let mut debounce = LintDebounce::from_config(&config);
    let t0 = Instant::now();

    let mut passes = Vec::new();
    let edits = ["entity A {", "entity A {\t", "entity A {\t}"];
    for (i, text) in edits.iter().enumerate() {
        let now = t0 + Duration::from_millis(50 * i as u64);
        debounce.note_edit(now);
        if debounce.take_due(now) {
            passes.push(validate_with(text, &config));
        }
    }
    assert!(passes.is_empty());

    assert!(debounce.take_due(t0 + Duration::from_millis(300)));
    let result = validate_with(edits[2], &config);
    assert!(result.valid);
    assert!(result.diagnostics.is_empty());
}
