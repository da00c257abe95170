//! Block-style YAML output.
//!
//! `serde_yaml` always indents by two spaces and leaves sequences flush with
//! their key. Compose files are conventionally written with sequences
//! indented under the key, so documents are emitted here instead.

use std::fmt::Write;

use serde_yaml::{Mapping, Number, Value, value::TaggedValue};

/// Plain scalars that YAML 1.1 readers turn into booleans or nulls.
const RESERVED_WORDS: [&str; 26] = [
    "~", "null", "Null", "NULL", "true", "True", "TRUE", "false", "False", "FALSE", "yes", "Yes",
    "YES", "no", "No", "NO", "on", "On", "ON", "off", "Off", "OFF", "y", "Y", "n", "N",
];

/// Renders YAML values as block-style text.
///
/// # Examples
///
/// ```
/// use runcompose::export::yaml::YamlEmitter;
///
/// let root: serde_yaml::Mapping = serde_yaml::from_str("ports: ['80:80']").unwrap();
/// assert_eq!(YamlEmitter::new(2).emit(&root), "ports:\n  - '80:80'\n");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct YamlEmitter {
    indent: usize,
}

impl YamlEmitter {
    /// Create an emitter using `indent` spaces per nesting level.
    pub fn new(indent: usize) -> Self {
        Self {
            indent: indent.max(1),
        }
    }

    /// Render a top-level mapping. The output ends with a newline unless
    /// the mapping is empty.
    pub fn emit(&self, root: &Mapping) -> String {
        let mut out = String::new();
        if root.is_empty() {
            out.push_str("{}\n");
        } else {
            self.write_mapping(&mut out, root, 0);
        }
        out
    }

    fn write_mapping(&self, out: &mut String, mapping: &Mapping, column: usize) {
        for (key, value) in mapping {
            pad(out, column);
            out.push_str(&inline(key));
            out.push(':');
            self.write_value(out, value, column);
        }
    }

    fn write_sequence(&self, out: &mut String, sequence: &[Value], column: usize) {
        for item in sequence {
            // A tag cannot precede a compact item, so the block starts below it.
            if matches!(item, Value::Tagged(_)) && is_block(item) {
                pad(out, column);
                out.push('-');
                self.write_value(out, item, column);
                continue;
            }

            match untagged(item) {
                Value::Mapping(mapping) if !mapping.is_empty() => {
                    let mut block = String::new();
                    self.write_mapping(&mut block, mapping, column + 2);
                    write_item_block(out, &block, column);
                }
                Value::Sequence(sequence) if !sequence.is_empty() => {
                    let mut block = String::new();
                    self.write_sequence(&mut block, sequence, column + 2);
                    write_item_block(out, &block, column);
                }
                Value::Null => {
                    pad(out, column);
                    out.push_str("-\n");
                }
                _ => {
                    pad(out, column);
                    out.push_str("- ");
                    out.push_str(&inline(item));
                    out.push('\n');
                }
            }
        }
    }

    /// Write what follows `key:` on the key's line, and any nested block.
    fn write_value(&self, out: &mut String, value: &Value, column: usize) {
        if let Value::Tagged(tagged) = value {
            if is_block(&tagged.value) {
                let _ = write!(out, " {}", tagged.tag);
                return self.write_value(out, &tagged.value, column);
            }
        }

        match value {
            Value::Null => out.push('\n'),
            Value::Mapping(mapping) if !mapping.is_empty() => {
                out.push('\n');
                self.write_mapping(out, mapping, column + self.indent);
            }
            Value::Sequence(sequence) if !sequence.is_empty() => {
                out.push('\n');
                self.write_sequence(out, sequence, column + self.indent);
            }
            _ => {
                out.push(' ');
                out.push_str(&inline(value));
                out.push('\n');
            }
        }
    }
}

impl Default for YamlEmitter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_INDENT)
    }
}

fn pad(out: &mut String, column: usize) {
    out.extend(std::iter::repeat_n(' ', column));
}

/// Splice a block rendered at `column + 2` into a sequence item at `column`.
fn write_item_block(out: &mut String, block: &str, column: usize) {
    pad(out, column);
    out.push_str("- ");
    out.push_str(&block[column + 2..]);
}

fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        value => value,
    }
}

fn is_block(value: &Value) -> bool {
    match untagged(value) {
        Value::Mapping(mapping) => !mapping.is_empty(),
        Value::Sequence(sequence) => !sequence.is_empty(),
        _ => false,
    }
}

/// Render a value that fits on one line: scalars and empty collections.
/// Non-empty collections (only reachable as mapping keys) use flow style.
fn inline(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number(n),
        Value::String(s) => string(s),
        Value::Sequence(sequence) => {
            let items: Vec<_> = sequence.iter().map(inline).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(mapping) => {
            let items: Vec<_> = mapping
                .iter()
                .map(|(key, value)| format!("{}: {}", inline(key), inline(value)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
        Value::Tagged(tagged) => tagged_inline(tagged),
    }
}

fn tagged_inline(tagged: &TaggedValue) -> String {
    format!("{} {}", tagged.tag, inline(&tagged.value))
}

fn number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => {
            if f.is_nan() {
                ".nan".to_string()
            } else if f.is_infinite() {
                if f > 0.0 { ".inf" } else { "-.inf" }.to_string()
            } else {
                f.to_string()
            }
        }
        _ => n.to_string(),
    }
}

fn string(s: &str) -> String {
    if s.chars().any(|c| c.is_control()) {
        double_quoted(s)
    } else if needs_quotes(s) {
        format!("'{}'", s.replace('\'', "''"))
    } else {
        s.to_string()
    }
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Returns `true` if `s` cannot be written as a plain scalar.
fn needs_quotes(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };

    s.trim() != s
        || RESERVED_WORDS.contains(&s)
        || looks_numeric(s)
        || "[]{},#&*!|>'\"%@`".contains(first)
        || (matches!(first, '-' | '?' | ':')
            && s[first.len_utf8()..].chars().next().is_none_or(char::is_whitespace))
        || s.contains(": ")
        || s.contains(" #")
        || s.ends_with(':')
}

/// Returns `true` if a plain scalar `s` could be read back as a number.
fn looks_numeric(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    let unsigned = lower.trim_start_matches(['-', '+']);

    s.parse::<f64>().is_ok()
        || [".inf", ".nan"].contains(&unsigned)
        || ["0x", "0o", "0b"]
            .iter()
            .any(|prefix| unsigned.starts_with(prefix) && unsigned.len() > prefix.len())
        || (unsigned.starts_with(|c: char| c.is_ascii_digit())
            && unsigned.contains(':')
            && unsigned
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, ':' | '.' | '_')))
}
