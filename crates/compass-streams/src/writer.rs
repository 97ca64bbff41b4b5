//! Rendering a manifest back to `<streams>` XML.
//!
//! Output follows the layout model streams files use: one attribute per line
//! aligned under the first, a blank line between streams, contents indented
//! four spaces. Attributes are written as `name`, `type`, `filename_template`,
//! the pass-through attributes in their original order, then
//! `reference_time`, `clobber_mode`, `input_interval`, `output_interval`.

use std::fmt::Write as _;

use quick_xml::escape::escape;

use crate::model::{Stream, StreamManifest};

const ATTRIBUTE_INDENT: &str = "        ";
const CONTENT_INDENT: &str = "    ";

impl StreamManifest {
    /// The manifest as a `<streams>` document.
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<streams>\n");
        for stream in self {
            out.push('\n');
            write_stream(&mut out, stream);
        }
        out.push_str("\n</streams>\n");
        out
    }
}

fn attribute_list(stream: &Stream) -> Vec<(&str, String)> {
    let mut attrs = vec![
        ("name", stream.name.clone()),
        ("type", stream.stream_type.to_string()),
        ("filename_template", stream.filename_template.to_string()),
    ];
    attrs.extend(stream.attributes.iter().map(|(k, v)| (k.as_str(), v.clone())));
    if let Some(time) = &stream.reference_time {
        attrs.push(("reference_time", time.to_string()));
    }
    if let Some(mode) = &stream.clobber_mode {
        attrs.push(("clobber_mode", mode.to_string()));
    }
    if let Some(interval) = &stream.input_interval {
        attrs.push(("input_interval", interval.to_string()));
    }
    if let Some(interval) = &stream.output_interval {
        attrs.push(("output_interval", interval.to_string()));
    }
    attrs
}

fn write_stream(out: &mut String, stream: &Stream) {
    let attrs = attribute_list(stream);
    out.push_str("<stream");
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i == 0 {
            out.push(' ');
        } else {
            out.push('\n');
            out.push_str(ATTRIBUTE_INDENT);
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{key}=\"{}\"", escape(value.as_str()));
    }

    if stream.contents.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n\n");
    for entry in &stream.contents {
        let _ = writeln!(
            out,
            "{CONTENT_INDENT}<{} name=\"{}\"/>",
            entry.element(),
            escape(entry.name())
        );
    }
    out.push_str("</stream>\n");
}
