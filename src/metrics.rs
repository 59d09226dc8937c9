use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};

pub static DOCUMENTS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "documents_processed_total",
        "Document processing requests by outcome",
        &["outcome"]
    )
    .expect("documents_processed_total is registered once")
});

pub static PROCESSING_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "document_processing_seconds",
        "Time spent extracting inputs and filling the template"
    )
    .expect("document_processing_seconds is registered once")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    MalformedInput,
    FillError,
    Internal,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::MalformedInput => "malformed_input",
            Outcome::FillError => "fill_error",
            Outcome::Internal => "internal",
        }
    }
}

pub fn record(outcome: Outcome, seconds: f64) {
    DOCUMENTS_PROCESSED
        .with_label_values(&[outcome.as_str()])
        .inc();
    PROCESSING_SECONDS.observe(seconds);
}

/// Prometheus text exposition of the default registry.
pub fn render() -> anyhow::Result<Vec<u8>> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(buffer)
}
