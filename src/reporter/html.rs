//! Self-contained HTML report with a client-side filter box.

use crate::report::ScanReport;
use crate::reporter::Reporter;
use crate::resolver::ProvenanceRecord;

pub struct HtmlReporter;

impl HtmlReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn check_mark(value: bool) -> &'static str {
    if value { "&#10003;" } else { "&#10007;" }
}

fn record_row(record: &ProvenanceRecord) -> String {
    let defined = record.sources.iter().any(|s| {
        s.evidence
            .as_ref()
            .is_some_and(|e| e.defined_as_parameter)
    });
    let usages: usize = record
        .sources
        .iter()
        .filter_map(|s| s.evidence.as_ref())
        .map(|e| e.usage_count)
        .sum();
    let sources: Vec<String> = record
        .sources
        .iter()
        .map(|s| {
            let class = if s.is_positive() { "hit" } else { "gap" };
            format!(r#"<span class="badge {class}">{}</span>"#, s.source)
        })
        .collect();

    format!(
        r#"        <tr>
            <td><a href="{url}" target="_blank">{name}</a></td>
            <td>{job_type}</td>
            <td>{found}</td>
            <td>{defined}</td>
            <td>{usages}</td>
            <td>{sources}</td>
        </tr>"#,
        url = escape(&record.job_url),
        name = escape(&record.job_name),
        job_type = record.job_type,
        found = check_mark(record.found),
        defined = check_mark(defined),
        sources = sources.join(" "),
    )
}

fn reconciliation_section(report: &ScanReport) -> String {
    let Some(reconciliation) = &report.reconciliation else {
        return String::new();
    };

    let orphan_jobs: Vec<String> = reconciliation
        .orphan_jobs
        .iter()
        .map(|j| format!("<li>{}</li>", escape(j)))
        .collect();
    let orphan_repos: Vec<String> = reconciliation
        .orphan_repos
        .iter()
        .map(|r| format!("<li>{}</li>", escape(r)))
        .collect();

    format!(
        r#"    <div class="section">
        <h2>Reconciliation</h2>
        <h3>Jobs without repository evidence ({})</h3>
        <ul>{}</ul>
        <h3>Repositories without a correlated job ({})</h3>
        <ul>{}</ul>
    </div>"#,
        orphan_jobs.len(),
        orphan_jobs.join("\n"),
        orphan_repos.len(),
        orphan_repos.join("\n"),
    )
}

impl Reporter for HtmlReporter {
    fn report(&self, report: &ScanReport) -> String {
        let rows: Vec<String> = report.records.iter().map(record_row).collect();
        let summary = &report.summary;

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Parameter Provenance Report - {parameter}</title>
<style>
    body {{ font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 0; background: #f4f5f7; color: #333; }}
    .header {{ background: #335eea; color: white; padding: 24px 32px; }}
    .header h1 {{ margin: 0 0 4px 0; font-size: 1.6em; }}
    .header .meta {{ opacity: 0.85; font-size: 0.9em; }}
    .stats {{ display: flex; gap: 16px; padding: 24px 32px; flex-wrap: wrap; }}
    .stat {{ background: white; border-radius: 8px; padding: 16px 24px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }}
    .stat .num {{ font-size: 2em; font-weight: bold; color: #335eea; }}
    .stat .label {{ color: #6c757d; font-size: 0.85em; text-transform: uppercase; }}
    .section {{ margin: 0 32px 24px; background: white; border-radius: 8px; padding: 20px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }}
    table {{ width: 100%; border-collapse: collapse; }}
    th {{ background: #335eea; color: white; padding: 10px; text-align: left; }}
    td {{ padding: 8px 10px; border-bottom: 1px solid #e9ecef; }}
    tr:hover {{ background: #f8f9fa; }}
    .badge {{ display: inline-block; padding: 2px 8px; border-radius: 10px; font-size: 0.8em; }}
    .badge.hit {{ background: #28a745; color: white; }}
    .badge.gap {{ background: #ffc107; color: #333; }}
    #filter {{ width: 100%; padding: 10px; margin-bottom: 12px; border: 1px solid #ddd; border-radius: 6px; box-sizing: border-box; }}
</style>
</head>
<body>
    <div class="header">
        <h1>Parameter Provenance: {parameter}</h1>
        <div class="meta">{jenkins_url} &middot; generated {generated_at}</div>
    </div>
    <div class="stats">
        <div class="stat"><div class="num">{total}</div><div class="label">Jobs scanned</div></div>
        <div class="stat"><div class="num">{with_param}</div><div class="label">Jobs with parameter</div></div>
        <div class="stat"><div class="num">{defined}</div><div class="label">Defined as parameter</div></div>
        <div class="stat"><div class="num">{used_only}</div><div class="label">Used without definition</div></div>
        <div class="stat"><div class="num">{gaps}</div><div class="label">Coverage gaps</div></div>
    </div>
    <div class="section">
        <input type="text" id="filter" placeholder="Filter jobs..." onkeyup="filterRows()">
        <table>
            <thead>
                <tr><th>Job</th><th>Type</th><th>Found</th><th>Defined</th><th>Usages</th><th>Sources</th></tr>
            </thead>
            <tbody>
{rows}
            </tbody>
        </table>
    </div>
{reconciliation}
    <script>
        function filterRows() {{
            const filter = document.getElementById('filter').value.toLowerCase();
            document.querySelectorAll('tbody tr').forEach(row => {{
                row.style.display = row.textContent.toLowerCase().includes(filter) ? '' : 'none';
            }});
        }}
    </script>
</body>
</html>
"#,
            parameter = escape(&report.parameter),
            jenkins_url = escape(&report.jenkins_url),
            generated_at = escape(&report.generated_at),
            total = summary.total_jobs,
            with_param = summary.jobs_with_parameter,
            defined = summary.defined_as_parameter,
            used_only = summary.used_only,
            gaps = summary.coverage_gaps,
            rows = rows.join("\n"),
            reconciliation = reconciliation_section(report),
        )
    }
}
