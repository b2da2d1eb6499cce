//! # YAML Source Index
//!
//! `serde_yaml::Value` does not retain source positions, so diagnostics
//! produced after parsing would otherwise only carry a node path. The
//! [`SourceIndex`] scans the document text once and records the line and
//! column of every block-style mapping key and sequence item, keyed by its
//! path from the root. Flow-style collections are not indexed; lookups for
//! nodes inside them fall back to the nearest indexed ancestor.

use std::collections::HashMap;

/// Map from document path to 1-based `(line, column)`.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    positions: HashMap<String, (usize, usize)>,
}

struct Frame {
    indent: usize,
    key: String,
    opens_block: bool,
    child_indent: Option<usize>,
    items: usize,
}

impl SourceIndex {
    /// Build an index for the given YAML text.
    pub fn scan(text: &str) -> Self {
        let mut positions = HashMap::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut block_scalar: Option<usize> = None;

        for (n, raw) in text.lines().enumerate() {
            let line = n + 1;
            let content = raw.trim_start();
            let indent = raw.len() - content.len();
            let content = content.trim_end();

            if let Some(owner_indent) = block_scalar {
                if content.is_empty() || indent > owner_indent {
                    continue;
                }
                block_scalar = None;
            }

            if content.is_empty()
                || content.starts_with('#')
                || content.starts_with("---")
                || content.starts_with("...")
                || content.starts_with('!')
            {
                continue;
            }

            if content == "-" || content.starts_with("- ") {
                while let Some(top) = stack.last() {
                    let owns_items = top.opens_block
                        && top.child_indent.map_or(true, |c| c == indent);
                    if top.indent > indent || (top.indent == indent && !owns_items) {
                        stack.pop();
                    } else {
                        break;
                    }
                }
                if let Some(top) = stack.last_mut() {
                    top.child_indent.get_or_insert(indent);
                    let index = top.items;
                    top.items += 1;
                    let mut path = path_of(&stack);
                    path.push(index.to_string());
                    positions.entry(path.join("/")).or_insert((line, indent + 1));
                }
                continue;
            }

            let Some((key, value)) = split_key(content) else {
                continue;
            };

            while let Some(top) = stack.last() {
                if top.indent >= indent {
                    stack.pop();
                } else {
                    break;
                }
            }
            if let Some(top) = stack.last_mut() {
                top.child_indent.get_or_insert(indent);
            }

            let mut path = path_of(&stack);
            path.push(key.clone());
            positions.entry(path.join("/")).or_insert((line, indent + 1));

            if value.starts_with('|') || value.starts_with('>') {
                block_scalar = Some(indent);
            }

            stack.push(Frame {
                indent,
                key,
                opens_block: value.is_empty() || value.starts_with('#'),
                child_indent: None,
                items: 0,
            });
        }

        Self { positions }
    }

    /// Returns the position of the node at `path`, or of its nearest indexed
    /// ancestor. The document root has no position.
    pub fn position(&self, path: &[String]) -> Option<(usize, usize)> {
        (1..=path.len())
            .rev()
            .find_map(|len| self.positions.get(&path[..len].join("/")).copied())
    }

    /// Returns the number of indexed nodes.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn path_of(stack: &[Frame]) -> Vec<String> {
    stack.iter().map(|f| f.key.clone()).collect()
}

/// Split `key: value` into its key (unquoted) and the trimmed value text.
fn split_key(content: &str) -> Option<(String, &str)> {
    if content.starts_with('{') || content.starts_with('[') {
        return None;
    }
    for quote in ['"', '\''] {
        if let Some(rest) = content.strip_prefix(quote) {
            let end = rest.find(quote)?;
            let after = rest[end + 1..].trim_start();
            let value = after.strip_prefix(':')?;
            return Some((rest[..end].to_string(), value.trim()));
        }
    }
    let (key, value) = match content.find(": ") {
        Some(pos) => (&content[..pos], &content[pos + 2..]),
        None => (content.strip_suffix(':')?, ""),
    };
    Some((key.trim_end().to_string(), value.trim()))
}
