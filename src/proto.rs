//! Protobuf messages for TensorBoard event files.
//!
//! Hand-written prost mirrors of the `Event` and `Summary` messages from
//! TensorFlow's `event.proto` / `summary.proto`, reduced to the fields that
//! scalar extraction needs. Field numbers match the upstream definitions;
//! everything else (graphs, histograms, images, tensors) arrives as unknown
//! fields and is skipped by the decoder.

/// One record in an event file.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Event {
    /// Seconds since the epoch.
    #[prost(double, tag = "1")]
    pub wall_time: f64,
    /// Global step of the run at the time of this event.
    #[prost(int64, tag = "2")]
    pub step: i64,
    /// Present for summary events; version markers and session logs omit it.
    #[prost(message, optional, tag = "5")]
    pub summary: Option<Summary>,
}

/// A set of tagged values emitted together.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Summary {
    #[prost(message, repeated, tag = "1")]
    pub value: Vec<SummaryValue>,
}

/// A single tagged value inside a summary.
///
/// Only the `simple_value` arm of the upstream oneof is modelled; a value
/// carrying a histogram, image, audio or tensor decodes with `value: None`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SummaryValue {
    #[prost(string, tag = "1")]
    pub tag: String,
    #[prost(oneof = "summary_value::Value", tags = "2")]
    pub value: Option<summary_value::Value>,
}

pub mod summary_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(float, tag = "2")]
        SimpleValue(f32),
    }
}
