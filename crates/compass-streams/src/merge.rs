//! Applying a test case's stream overrides to a core template manifest.

use crate::model::{Stream, StreamManifest};

impl StreamManifest {
    /// Merge `overrides` into this manifest.
    ///
    /// For a stream present in both: `type` and `filename_template` are
    /// replaced, every other attribute the override sets replaces the
    /// template's, and override entries the template lacks are appended in
    /// order. Streams only in `overrides` are appended. A cadence left behind
    /// by a change of direction (say `input_interval` on a stream now of type
    /// `output`) is dropped.
    pub fn apply_overrides(&mut self, overrides: &StreamManifest) {
        for stream in overrides {
            match self.get_mut(&stream.name) {
                Some(base) => {
                    merge_stream(base, stream);
                    tracing::debug!(stream = %stream.name, "merged stream override");
                }
                None => {
                    self.push(stream.clone());
                    tracing::debug!(stream = %stream.name, "added stream from overrides");
                }
            }
        }
    }
}

fn merge_stream(base: &mut Stream, over: &Stream) {
    base.stream_type = over.stream_type;
    base.filename_template = over.filename_template.clone();
    if over.input_interval.is_some() {
        base.input_interval = over.input_interval.clone();
    }
    if over.output_interval.is_some() {
        base.output_interval = over.output_interval.clone();
    }
    if over.reference_time.is_some() {
        base.reference_time = over.reference_time;
    }
    if over.clobber_mode.is_some() {
        base.clobber_mode = over.clobber_mode;
    }
    for (key, value) in &over.attributes {
        base.set_attribute(key.clone(), value.clone());
    }
    for entry in &over.contents {
        if !base.contains(entry) {
            base.contents.push(entry.clone());
        }
    }

    if !base.stream_type.is_input() && base.input_interval.take().is_some() {
        tracing::debug!(stream = %base.name, "dropped input_interval after type change");
    }
    if !base.stream_type.is_output() && base.output_interval.take().is_some() {
        tracing::debug!(stream = %base.name, "dropped output_interval after type change");
    }
}
