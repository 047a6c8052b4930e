//! Targeted surgery on a document's frontmatter block.
//!
//! The block is never parsed into a data structure and re-serialized; doing so
//! would rewrite formatting the caller did not ask to change. Instead the text
//! is split into lines, the property line is located with a minimal scan, and
//! the affected span is replaced in place. Every line outside that span is
//! preserved byte for byte, and any input that does not match the expected
//! shape comes back unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

/// `<indent><name>:<rest>` — indentation, property name up to the first
/// colon, optional inline value.
static PROPERTY_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([^:]+):\s*(.*)$").unwrap());

const BLOCK_DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
enum PropertyShape {
    /// Single value on the property line itself.
    Scalar { stored: String },
    /// `[v1, v2, v3]` on the property line.
    InlineList { body: String },
    /// Values live on subsequent `- item` lines (rest was empty, `[`, or `|`).
    BlockList,
}

#[derive(Debug)]
struct PropertyLine {
    index: usize,
    indent: String,
    /// Name segment exactly as it appears before the colon.
    name: String,
    shape: PropertyShape,
}

/// Remove one value of `property` from the document's frontmatter block and
/// return the new text. The property line is deleted entirely when its last
/// value goes.
///
/// Total and pure: whenever the block, the property, or the value is not
/// found — or the block is malformed — the input is returned unchanged, so a
/// batch over many documents can never be halted or corrupted by one odd
/// document.
pub fn remove_property_value(content: &str, property: &str, value: &str) -> String {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();

    let Some((open, close)) = block_bounds(&lines) else {
        return content.to_string();
    };
    let Some(found) = locate_property(&lines, open, close, property) else {
        return content.to_string();
    };

    match found.shape {
        PropertyShape::Scalar { ref stored } => {
            if stored != value {
                return content.to_string();
            }
            lines.remove(found.index);
        }
        PropertyShape::InlineList { ref body } => {
            let interior = &body[1..body.len() - 1];
            let double_quoted = format!("\"{value}\"");
            let single_quoted = format!("'{value}'");
            let items: Vec<&str> = interior
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect();
            let kept: Vec<&str> = items
                .iter()
                .copied()
                .filter(|item| {
                    *item != value && *item != double_quoted && *item != single_quoted
                })
                .collect();
            if kept.len() == items.len() {
                return content.to_string();
            }
            if kept.is_empty() {
                lines.remove(found.index);
            } else {
                lines[found.index] =
                    format!("{}{}: [{}]", found.indent, found.name, kept.join(", "));
            }
        }
        PropertyShape::BlockList => {
            let mut kept: Vec<String> = Vec::new();
            let mut removed = false;
            let mut stop = found.index + 1;
            while stop < close {
                let line = &lines[stop];
                let trimmed = line.trim();
                if let Some(rest) = trimmed.strip_prefix('-') {
                    if rest.trim() == value {
                        removed = true;
                    } else {
                        kept.push(line.clone());
                    }
                    stop += 1;
                } else if trimmed.is_empty() || !indented_under(line, &found.indent) {
                    break;
                } else {
                    stop += 1;
                }
            }
            if !removed {
                return content.to_string();
            }
            let replacement: Vec<String> = if kept.is_empty() {
                Vec::new()
            } else {
                let mut span = Vec::with_capacity(kept.len() + 1);
                span.push(lines[found.index].clone());
                span.extend(kept);
                span
            };
            lines.splice(found.index..stop, replacement);
        }
    }

    lines.join("\n")
}

/// First line that is exactly `---` after trimming opens the block; the next
/// such line closes it. No closing delimiter means no editable block.
fn block_bounds(lines: &[String]) -> Option<(usize, usize)> {
    let mut open = None;
    for (idx, line) in lines.iter().enumerate() {
        if line.trim() != BLOCK_DELIMITER {
            continue;
        }
        match open {
            None => open = Some(idx),
            Some(start) => return Some((start, idx)),
        }
    }
    None
}

/// First line strictly inside the block whose trimmed name segment equals
/// `property`. A duplicate declaration further down is never reached.
fn locate_property(
    lines: &[String],
    open: usize,
    close: usize,
    property: &str,
) -> Option<PropertyLine> {
    for idx in open + 1..close {
        let Some(caps) = PROPERTY_LINE_RE.captures(&lines[idx]) else {
            continue;
        };
        if caps[2].trim() != property {
            continue;
        }
        let rest = caps[3].trim().to_string();
        let shape = if rest.is_empty() || rest == "[" || rest == "|" {
            PropertyShape::BlockList
        } else if rest.starts_with('[') && rest.ends_with(']') {
            PropertyShape::InlineList { body: rest }
        } else {
            PropertyShape::Scalar { stored: rest }
        };
        return Some(PropertyLine {
            index: idx,
            indent: caps[1].to_string(),
            name: caps[2].to_string(),
            shape,
        });
    }
    None
}

/// True when the line is indented strictly deeper than `indent`.
fn indented_under(line: &str, indent: &str) -> bool {
    line.strip_prefix(indent)
        .is_some_and(|rest| rest.starts_with(' '))
}
