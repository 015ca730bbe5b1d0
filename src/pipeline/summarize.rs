use serde::{Deserialize, Serialize};

use crate::cucumber::{Element, ElementKind, Feature, Status};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,
    pub undefined: usize,
    pub ambiguous: usize,
    pub unknown: usize,
}

impl Counts {
    pub fn record(&mut self, status: Status) {
        *self.slot(status) += 1;
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Passed => self.passed,
            Status::Failed => self.failed,
            Status::Skipped => self.skipped,
            Status::Pending => self.pending,
            Status::Undefined => self.undefined,
            Status::Ambiguous => self.ambiguous,
            Status::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        Status::ALL.iter().map(|status| self.get(*status)).sum()
    }

    /// Anything that neither passed nor failed.
    pub fn other(&self) -> usize {
        self.total() - self.passed - self.failed
    }

    pub fn merge(&mut self, other: &Counts) {
        for status in Status::ALL {
            *self.slot(status) += other.get(status);
        }
    }

    fn slot(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Passed => &mut self.passed,
            Status::Failed => &mut self.failed,
            Status::Skipped => &mut self.skipped,
            Status::Pending => &mut self.pending,
            Status::Undefined => &mut self.undefined,
            Status::Ambiguous => &mut self.ambiguous,
            Status::Unknown => &mut self.unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementSummary {
    pub name: String,
    pub kind: ElementKind,
    pub status: Status,
    pub steps: Counts,
    pub duration_ns: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureSummary {
    pub name: String,
    pub uri: String,
    pub status: Status,
    pub scenarios: Counts,
    pub steps: Counts,
    pub duration_ns: u64,
    pub elements: Vec<ElementSummary>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub status: Status,
    pub feature_counts: Counts,
    pub scenario_counts: Counts,
    pub step_counts: Counts,
    pub duration_ns: u64,
    pub features: Vec<FeatureSummary>,
}

pub fn summarize_element(element: &Element) -> ElementSummary {
    let mut status = Status::Passed;
    let mut steps = Counts::default();
    let mut duration_ns = 0u64;

    for hook in element.before.iter().chain(&element.after) {
        status = status.worst(hook.result.status);
        duration_ns = duration_ns.saturating_add(hook.result.duration.unwrap_or(0));
    }

    for step in &element.steps {
        status = status.worst(step.result.status);
        steps.record(step.result.status);
        duration_ns = duration_ns.saturating_add(step.result.duration.unwrap_or(0));
    }

    ElementSummary {
        name: element.name.clone(),
        kind: element.kind,
        status,
        steps,
        duration_ns,
    }
}

pub fn summarize_feature(feature: &Feature) -> FeatureSummary {
    let elements: Vec<ElementSummary> = feature.elements.iter().map(summarize_element).collect();

    let mut status = Status::Passed;
    let mut scenarios = Counts::default();
    let mut steps = Counts::default();
    let mut duration_ns = 0u64;

    for element in &elements {
        status = status.worst(element.status);
        steps.merge(&element.steps);
        duration_ns = duration_ns.saturating_add(element.duration_ns);
        if element.kind == ElementKind::Scenario {
            scenarios.record(element.status);
        }
    }

    FeatureSummary {
        name: feature.name.clone(),
        uri: feature.uri.clone(),
        status,
        scenarios,
        steps,
        duration_ns,
        elements,
    }
}

#[tracing::instrument(
    name = "pipeline_stage summarize",
    skip_all,
    fields(
        pipeline.stage = "summarize",
        report.status,
        report.scenarios,
        report.steps,
    )
)]
pub fn summarize(features: &[Feature]) -> RunSummary {
    let mut summary = RunSummary {
        status: Status::Passed,
        ..Default::default()
    };

    for feature in features {
        let feature_summary = summarize_feature(feature);
        summary.status = summary.status.worst(feature_summary.status);
        summary.feature_counts.record(feature_summary.status);
        summary.scenario_counts.merge(&feature_summary.scenarios);
        summary.step_counts.merge(&feature_summary.steps);
        summary.duration_ns = summary.duration_ns.saturating_add(feature_summary.duration_ns);
        summary.features.push(feature_summary);
    }

    let span = tracing::Span::current();
    span.record("report.status", summary.status.as_str());
    span.record("report.scenarios", summary.scenario_counts.total());
    span.record("report.steps", summary.step_counts.total());

    summary
}

/// Formats a nanosecond duration as `1m 02.345s` or `0.123s`.
pub fn format_duration(duration_ns: u64) -> String {
    let total_ms = duration_ns / 1_000_000;
    let minutes = total_ms / 60_000;
    let seconds = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    if minutes > 0 {
        format!("{minutes}m {seconds:02}.{millis:03}s")
    } else {
        format!("{seconds}.{millis:03}s")
    }
}
