use super::types::SuiteResults;
use crate::runner::state::{Outcome, ScenarioReport};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

pub const JUNIT_FILE: &str = "junit.xml";

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML report string from suite results
pub fn generate_junit_xml(results: &SuiteResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total = results.reports.len().to_string();
    let failures = (results.summary.partial + results.summary.failed).to_string();
    let time = seconds(results.duration_ms);
    let suite_name = format!("crm-tester.{}", results.suite.name());

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "crm-tester-run"));
    suites_start.push_attribute(("tests", total.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    suites_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", suite_name.as_str()));
    suite_start.push_attribute(("tests", total.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("skipped", "0"));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute(("time", time.as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for report in &results.reports {
        write_test_case(&mut writer, &suite_name, report)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    classname: &str,
    report: &ScenarioReport,
) -> Result<()> {
    let time = seconds(report.duration_ms.unwrap_or(0));
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", report.name.as_str()));
    case_start.push_attribute(("classname", classname));
    case_start.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(case_start))?;

    if report.outcome != Outcome::Passed {
        let message = report
            .error
            .clone()
            .unwrap_or_else(|| format!("scenario {}", report.outcome.label()));

        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", message.as_str()));
        fail_start.push_attribute(("type", report.outcome.label()));
        writer.write_event(Event::Start(fail_start))?;
        writer.write_event(Event::Text(BytesText::new(&message)))?;
        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write `junit.xml` into `output_dir`
pub fn write_report(results: &SuiteResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join(JUNIT_FILE);
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::summary::aggregate;
    use crate::runner::Suite;

    #[test]
    fn test_generate_junit_xml() {
        let reports = vec![
            ScenarioReport::new("lead_management", Outcome::Passed),
            ScenarioReport::new("deal_management", Outcome::Partial),
            ScenarioReport {
                error: Some("frappe.client.insert answered with status 417".to_string()),
                ..ScenarioReport::new("contact_management", Outcome::Failed)
            },
        ];
        let results = SuiteResults {
            session_id: "test-session".to_string(),
            suite: Suite::Features,
            summary: aggregate(&reports),
            reports,
            duration_ms: 3500,
            generated_at: "2023-01-01 12:00:00".to_string(),
        };

        let xml = generate_junit_xml(&results).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="crm-tester-run""#));
        assert!(xml.contains(r#"<testsuite name="crm-tester.features""#));
        assert!(xml.contains(r#"tests="3""#));
        assert!(xml.contains(r#"failures="2""#));
        assert!(xml.contains(r#"<testcase name="lead_management""#));
        assert!(xml.contains(r#"message="scenario PARTIAL""#));
        assert!(xml.contains(r#"message="frappe.client.insert answered with status 417""#));
        assert!(xml.contains(r#"type="FAILED""#));
    }
}
