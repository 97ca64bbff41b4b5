//! # Option Interpolation
//!
//! Option values may refer to other options:
//!
//! - `${name}`: option `name` in the same section (or `[DEFAULT]`);
//! - `${section:name}`: option `name` in another section;
//! - `$$`: a literal `$`.
//!
//! References expand recursively up to [`MAX_DEPTH`] levels, which also
//! bounds reference cycles.

use crate::document::{normalize_key, ConfigDocument};
use crate::error::MalformedConfig;

/// Maximum nesting of `${...}` expansions.
pub const MAX_DEPTH: usize = 10;

/// Expand the references in `raw`, the value of `section`/`key`.
pub fn expand(
    doc: &ConfigDocument,
    section: &str,
    key: &str,
    raw: &str,
) -> Result<String, MalformedConfig> {
    expand_at(doc, section, key, raw, 1)
}

fn expand_at(
    doc: &ConfigDocument,
    section: &str,
    key: &str,
    raw: &str,
    depth: usize,
) -> Result<String, MalformedConfig> {
    let fail = |detail: String| MalformedConfig::Interpolation {
        section: section.to_string(),
        key: key.to_string(),
        detail,
    };

    if depth > MAX_DEPTH {
        return Err(fail(format!(
            "references nest deeper than {MAX_DEPTH} levels (is there a cycle?)"
        )));
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(body) = after.strip_prefix('{') {
            let end = body
                .find('}')
                .ok_or_else(|| fail("unterminated '${' reference".to_string()))?;
            let reference = &body[..end];
            let parts: Vec<&str> = reference.split(':').collect();
            let (ref_section, ref_key) = match parts.as_slice() {
                [name] => (section, *name),
                [other, name] => (*other, *name),
                _ => {
                    return Err(fail(format!(
                        "reference ${{{reference}}} has more than one ':'"
                    )))
                }
            };
            let ref_key = normalize_key(ref_key);
            let value = doc
                .raw(ref_section, &ref_key)
                .ok_or_else(|| fail(format!("reference ${{{reference}}} names no option")))?;
            out.push_str(&expand_at(doc, ref_section, &ref_key, value, depth + 1)?);
            rest = &body[end + 1..];
        } else {
            return Err(fail("'$' must be followed by '$' or '{'".to_string()));
        }
    }
    out.push_str(rest);
    Ok(out)
}
