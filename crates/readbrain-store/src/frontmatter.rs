//! YAML front-matter splitting and tolerant decoding.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::warn;

const FENCE: &str = "---";

/// Split `text` into its YAML front-matter and body.
///
/// Front-matter must open on the first line with `---` and close with the
/// next `---` line. Without both fences the whole text is body. The body is
/// everything after the closing fence line, untouched.
pub fn split(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.split_inclusive('\n');
    let first = match lines.next() {
        Some(line) if is_fence(line) => line,
        _ => return (None, text),
    };

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, text)
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

/// Decode front-matter into `T`. Blank or broken YAML yields `T::default()`;
/// `origin` is only used for the warning.
pub fn decode<T>(yaml: &str, origin: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if yaml.trim().is_empty() {
        return T::default();
    }
    match serde_yaml::from_str::<Option<T>>(yaml) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            warn!("malformed YAML in {}: {e}", origin.display());
            T::default()
        }
    }
}
