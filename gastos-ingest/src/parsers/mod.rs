//! Bank-specific notification parsers.

pub mod spanish_bank;

/// Split a dump of several notifications into individual message bodies.
///
/// Messages are separated by one or more blank lines; lines inside a
/// message are joined back with `\n` and surrounding whitespace is trimmed.
pub fn split_messages(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n").trim().to_string());
                current.clear();
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        out.push(current.join("\n").trim().to_string());
    }

    out
}
