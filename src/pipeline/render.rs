//! Single-file HTML rendering of a conformance run.
//!
//! Every scenario is expanded down to its steps. Text taken from result
//! files is escaped; the page footer comes from the request and is
//! inserted as-is.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cucumber::{Element, Feature, Status, Step, Tag};
use crate::report::ReportRequest;

use super::summarize::{Counts, ElementSummary, FeatureSummary, RunSummary, format_duration};

pub const REPORT_TITLE: &str = "Ingress Conformance";

pub struct RenderParams<'a> {
    pub request: &'a ReportRequest,
    pub features: &'a [Feature],
    pub summary: &'a RunSummary,
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
}

#[tracing::instrument(
    name = "pipeline_stage render",
    skip_all,
    fields(pipeline.stage = "render", report.bytes)
)]
pub fn render_html(params: RenderParams<'_>) -> String {
    let mut html = String::with_capacity(64 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("<title>{REPORT_TITLE}</title>\n"));
    html.push_str("<style>\n");
    html.push_str(css());
    html.push_str("\n</style>\n</head>\n<body>\n");

    render_header(&mut html, &params);
    render_totals(&mut html, params.summary);
    render_overview(&mut html, params.summary);

    html.push_str("<section class=\"features\">\n");
    for (index, (feature, summary)) in params
        .features
        .iter()
        .zip(&params.summary.features)
        .enumerate()
    {
        render_feature(&mut html, index, feature, summary);
    }
    html.push_str("</section>\n\n");

    html.push_str("<footer>\n");
    html.push_str(&params.request.page_footer);
    html.push_str("\n</footer>\n\n");
    html.push_str("</body>\n</html>\n");

    tracing::Span::current().record("report.bytes", html.len());

    html
}

fn render_header(html: &mut String, params: &RenderParams<'_>) {
    let request = params.request;

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{REPORT_TITLE}</h1>\n"));
    html.push_str("<dl class=\"meta\">\n");
    push_meta(html, "Ingress controller", &request.ingress.controller);
    push_meta(html, "Controller version", &request.ingress.version);
    if let Some(build) = &request.metadata.build {
        push_meta(html, "Build", build);
    }
    if let Some(release) = &request.metadata.release {
        push_meta(html, "Release", release);
    }
    push_meta(
        html,
        "Generated",
        &params
            .generated_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
    );
    push_meta(html, "Report", &params.report_id.to_string());
    html.push_str("</dl>\n</header>\n\n");
}

fn push_meta(html: &mut String, label: &str, value: &str) {
    html.push_str(&format!(
        "<div><dt>{}</dt><dd>{}</dd></div>\n",
        escape_html(label),
        escape_html(value)
    ));
}

fn render_totals(html: &mut String, summary: &RunSummary) {
    html.push_str("<section class=\"summary\">\n");
    html.push_str(&format!(
        "<h2>Summary {}</h2>\n",
        badge(summary.status)
    ));
    html.push_str("<div class=\"stats-grid\">\n");
    push_stat_card(html, "Features", &summary.feature_counts);
    push_stat_card(html, "Scenarios", &summary.scenario_counts);
    push_stat_card(html, "Steps", &summary.step_counts);
    html.push_str(&format!(
        "<div class=\"stat-card\"><span class=\"count\">{}</span><span class=\"label\">Duration</span></div>\n",
        format_duration(summary.duration_ns)
    ));
    html.push_str("</div>\n</section>\n\n");
}

fn push_stat_card(html: &mut String, label: &str, counts: &Counts) {
    html.push_str(&format!(
        "<div class=\"stat-card\"><span class=\"count\">{}</span><span class=\"label\">{}</span>\
         <span class=\"breakdown\"><span class=\"passed\">{} passed</span> \
         <span class=\"failed\">{} failed</span> <span class=\"other\">{} other</span></span></div>\n",
        counts.total(),
        label,
        counts.passed,
        counts.failed,
        counts.other()
    ));
}

fn render_overview(html: &mut String, summary: &RunSummary) {
    html.push_str("<section class=\"overview\">\n");
    html.push_str("<h2>Features</h2>\n");
    html.push_str("<table>\n<thead>\n<tr><th>Feature</th><th>Status</th>");
    html.push_str("<th>Scenarios</th><th>Passed</th><th>Failed</th><th>Other</th>");
    html.push_str("<th>Steps</th><th>Passed</th><th>Failed</th><th>Skipped</th><th>Other</th>");
    html.push_str("<th>Duration</th></tr>\n</thead>\n<tbody>\n");

    for (index, feature) in summary.features.iter().enumerate() {
        let steps = &feature.steps;
        html.push_str(&format!("<tr class=\"{}\">", feature.status.as_str()));
        html.push_str(&format!(
            "<td><a href=\"#feature-{index}\">{}</a></td>",
            escape_html(&feature.name)
        ));
        html.push_str(&format!("<td>{}</td>", badge(feature.status)));
        html.push_str(&format!(
            "<td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            feature.scenarios.total(),
            feature.scenarios.passed,
            feature.scenarios.failed,
            feature.scenarios.other()
        ));
        html.push_str(&format!(
            "<td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            steps.total(),
            steps.passed,
            steps.failed,
            steps.skipped,
            steps.total() - steps.passed - steps.failed - steps.skipped
        ));
        html.push_str(&format!("<td>{}</td>", format_duration(feature.duration_ns)));
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</section>\n\n");
}

fn render_feature(html: &mut String, index: usize, feature: &Feature, summary: &FeatureSummary) {
    html.push_str(&format!(
        "<article class=\"feature {}\" id=\"feature-{index}\">\n",
        summary.status.as_str()
    ));
    html.push_str(&format!(
        "<h2>{} <span class=\"keyword\">{}:</span> {}</h2>\n",
        badge(summary.status),
        escape_html(keyword_or(&feature.keyword, "Feature")),
        escape_html(&feature.name)
    ));
    if !feature.uri.is_empty() {
        html.push_str(&format!(
            "<p class=\"uri\">{}</p>\n",
            escape_html(&feature.uri)
        ));
    }
    render_tags(html, &feature.tags);
    render_description(html, &feature.description);

    for (element, element_summary) in feature.elements.iter().zip(&summary.elements) {
        render_element(html, element, element_summary);
    }

    html.push_str("</article>\n\n");
}

fn render_element(html: &mut String, element: &Element, summary: &ElementSummary) {
    let default_keyword = if element.is_background() {
        "Background"
    } else {
        "Scenario"
    };

    html.push_str(&format!(
        "<div class=\"scenario {}\">\n",
        summary.status.as_str()
    ));
    html.push_str(&format!(
        "<h3>{} <span class=\"keyword\">{}:</span> {} <span class=\"duration\">{}</span></h3>\n",
        badge(summary.status),
        escape_html(keyword_or(&element.keyword, default_keyword)),
        escape_html(&element.name),
        format_duration(summary.duration_ns)
    ));
    render_tags(html, &element.tags);
    render_description(html, &element.description);

    for hook in element.before.iter().chain(&element.after) {
        if let Some(message) = &hook.result.error_message {
            html.push_str(&format!(
                "<div class=\"hook {}\">Hook {}<pre><code>{}</code></pre></div>\n",
                hook.result.status.as_str(),
                badge(hook.result.status),
                escape_html(message)
            ));
        }
    }

    html.push_str("<ol class=\"steps\">\n");
    for step in &element.steps {
        render_step(html, step);
    }
    html.push_str("</ol>\n</div>\n");
}

fn render_step(html: &mut String, step: &Step) {
    let status = step.result.status;

    html.push_str(&format!("<li class=\"step {}\">", status.as_str()));
    html.push_str(&format!(
        "{} <span class=\"keyword\">{}</span> {}",
        badge(status),
        escape_html(step.keyword.trim()),
        escape_html(&step.name)
    ));
    if let Some(duration) = step.result.duration {
        html.push_str(&format!(
            " <span class=\"duration\">{}</span>",
            format_duration(duration)
        ));
    }
    if let Some(doc_string) = &step.doc_string {
        html.push_str(&format!(
            "<pre class=\"doc-string\"><code>{}</code></pre>",
            escape_html(&doc_string.value)
        ));
    }
    if let Some(message) = &step.result.error_message {
        html.push_str(&format!(
            "<pre class=\"error\"><code>{}</code></pre>",
            escape_html(message)
        ));
    }
    html.push_str("</li>\n");
}

fn render_tags(html: &mut String, tags: &[Tag]) {
    if tags.is_empty() {
        return;
    }

    html.push_str("<div class=\"tags\">");
    for tag in tags {
        html.push_str(&format!(
            "<span class=\"tag\">{}</span>",
            escape_html(&tag.name)
        ));
    }
    html.push_str("</div>\n");
}

fn render_description(html: &mut String, description: &str) {
    let description = description.trim();
    if !description.is_empty() {
        html.push_str(&format!(
            "<p class=\"description\">{}</p>\n",
            escape_html(description)
        ));
    }
}

fn keyword_or<'a>(keyword: &'a str, fallback: &'a str) -> &'a str {
    let keyword = keyword.trim();
    if keyword.is_empty() { fallback } else { keyword }
}

fn badge(status: Status) -> String {
    format!(
        "<span class=\"badge {}\">{}</span>",
        status.as_str(),
        status.as_str()
    )
}

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn css() -> &'static str {
    r#"
:root {
  --bg: #ffffff;
  --surface: #f6f8fa;
  --border: #d0d7de;
  --text: #1f2328;
  --text-muted: #656d76;
  --passed: #1a7f37;
  --failed: #cf222e;
  --skipped: #9a6700;
  --pending: #bc4c00;
  --undefined: #8250df;
  --ambiguous: #bf3989;
  --unknown: #656d76;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
  background: var(--bg);
  color: var(--text);
  line-height: 1.5;
  padding: 2rem;
  max-width: 1200px;
  margin: 0 auto;
}

header { border-bottom: 1px solid var(--border); padding-bottom: 1rem; margin-bottom: 2rem; }
h1 { font-size: 2rem; margin-bottom: 0.75rem; }
h2 { font-size: 1.4rem; margin-bottom: 1rem; }
h3 { font-size: 1rem; margin-bottom: 0.5rem; }
section, article { margin-bottom: 2rem; }

.meta { display: flex; flex-wrap: wrap; gap: 0.5rem 2rem; color: var(--text-muted); }
.meta dt { font-size: 0.75rem; text-transform: uppercase; }
.meta dd { color: var(--text); font-weight: 600; }

.stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 1rem; }
.stat-card { background: var(--surface); border: 1px solid var(--border); border-radius: 6px; padding: 1rem; display: flex; flex-direction: column; }
.stat-card .count { font-size: 1.8rem; font-weight: 700; }
.stat-card .label { color: var(--text-muted); }
.breakdown { font-size: 0.85rem; }
.breakdown .passed { color: var(--passed); }
.breakdown .failed { color: var(--failed); }
.breakdown .other { color: var(--text-muted); }

table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th, td { border: 1px solid var(--border); padding: 0.4rem 0.6rem; text-align: left; }
th { background: var(--surface); }
a { color: inherit; }

.badge { display: inline-block; border-radius: 999px; padding: 0 0.6rem; font-size: 0.75rem; font-weight: 600; color: #fff; text-transform: uppercase; vertical-align: middle; }
.badge.passed { background: var(--passed); }
.badge.failed { background: var(--failed); }
.badge.skipped { background: var(--skipped); }
.badge.pending { background: var(--pending); }
.badge.undefined { background: var(--undefined); }
.badge.ambiguous { background: var(--ambiguous); }
.badge.unknown { background: var(--unknown); }

.feature { border-top: 1px solid var(--border); padding-top: 1rem; }
.keyword { color: var(--text-muted); font-weight: 600; }
.uri, .description { color: var(--text-muted); margin-bottom: 0.5rem; white-space: pre-line; }
.tags { margin-bottom: 0.5rem; }
.tag { display: inline-block; background: var(--surface); border: 1px solid var(--border); border-radius: 4px; padding: 0 0.4rem; margin-right: 0.3rem; font-size: 0.8rem; }

.scenario { border-left: 4px solid var(--border); padding: 0.5rem 1rem; margin: 1rem 0; background: var(--surface); }
.scenario.passed { border-left-color: var(--passed); }
.scenario.failed { border-left-color: var(--failed); }
.scenario.skipped, .scenario.pending, .scenario.undefined, .scenario.ambiguous { border-left-color: var(--skipped); }
.duration { color: var(--text-muted); font-size: 0.8rem; font-weight: normal; }

.steps { list-style: none; }
.step { padding: 0.2rem 0; }
pre { background: var(--bg); border: 1px solid var(--border); border-radius: 4px; padding: 0.5rem; margin: 0.3rem 0; overflow-x: auto; font-size: 0.8rem; }
pre.error { border-color: var(--failed); color: var(--failed); }

footer { border-top: 1px solid var(--border); padding-top: 1rem; color: var(--text-muted); text-align: center; }
"#
}
