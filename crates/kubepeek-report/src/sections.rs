use std::fmt::Write;

use kubepeek_types::{ListOutcome, Report, ResourceListResult};

/// Underline printed below each section heading
pub const SECTION_RULE: &str = "========";

/// Append the text block for one kind
pub fn write_section(out: &mut String, result: &ResourceListResult) {
    // fmt::Write into a String never fails
    match &result.outcome {
        ListOutcome::Listed(names) => {
            let _ = writeln!(out, "{}\n{}", result.kind.title(), SECTION_RULE);
            for name in names {
                let _ = writeln!(out, " - {}", name);
            }
        }
        ListOutcome::Failed(cause) => {
            let _ = writeln!(
                out,
                "Something went wrong. I can't get the {}. [{}]",
                result.kind.label(),
                cause
            );
        }
    }
}

/// Plain text of every section in the report, in order
pub fn report_text(report: &Report) -> String {
    let mut out = String::new();
    for result in report.results() {
        write_section(&mut out, result);
    }
    out
}
