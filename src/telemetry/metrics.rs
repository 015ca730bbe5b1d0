use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("conformance-reports"));

pub static REPORT_GENERATION_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.generation.duration")
        .with_description("Total report generation duration in seconds")
        .with_unit("s")
        .build()
});

pub static REPORT_RESULT_FILES: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.result_files")
        .with_description("Number of cucumber JSON files read per report")
        .with_unit("{file}")
        .build()
});

pub static REPORT_FEATURES: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.features")
        .with_description("Features reported, by status")
        .with_unit("{feature}")
        .build()
});

pub static REPORT_SCENARIOS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.scenarios")
        .with_description("Scenarios reported, by status")
        .with_unit("{scenario}")
        .build()
});
