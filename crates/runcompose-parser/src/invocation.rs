//! Splitting an invocation's words into flags and positional arguments.
//!
//! Parsing follows the docker CLI conventions that matter for translation:
//!
//! - flag parsing halts at the first positional word (the image), so flags
//!   of the containerized command are never read as docker flags,
//! - `--` ends flag parsing,
//! - `--name=value` and `--name value` are equivalent,
//! - grouped short flags expand (`-it`, `-dp 80:80`, `-p8080:80`),
//! - repeated flags collect their values in order.

use indexmap::IndexMap;
use log::trace;

use crate::{
    builtin_flags::FlagRegistry,
    lexer::Word,
    segment::Subcommand,
    span::Span,
};

/// The raw value(s) given to a flag before any transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// The flag appeared without a value.
    Switch,
    /// The flag appeared once with a value.
    Text(String),
    /// The flag appeared several times with values, in occurrence order.
    List(Vec<String>),
}

impl RawValue {
    /// Record another occurrence of the flag.
    ///
    /// Valueless occurrences do not displace values.
    fn push(&mut self, value: Option<String>) {
        let Some(value) = value else {
            return;
        };

        *self = match std::mem::replace(self, RawValue::Switch) {
            RawValue::Switch => RawValue::Text(value),
            RawValue::Text(first) => RawValue::List(vec![first, value]),
            RawValue::List(mut values) => {
                values.push(value);
                RawValue::List(values)
            }
        };
    }

    /// Returns the values in occurrence order. A switch has none.
    pub fn values(&self) -> &[String] {
        match self {
            RawValue::Switch => &[],
            RawValue::Text(value) => std::slice::from_ref(value),
            RawValue::List(values) => values,
        }
    }

    /// Returns the last value given, if any.
    pub fn last(&self) -> Option<&str> {
        self.values().last().map(String::as_str)
    }

    /// Returns `true` if the flag appeared without any value.
    pub fn is_switch(&self) -> bool {
        matches!(self, RawValue::Switch)
    }

    /// Returns the values joined with commas, the way they are shown in
    /// ignored-option comments.
    pub fn joined(&self) -> Option<String> {
        match self {
            RawValue::Switch => None,
            _ => Some(self.values().join(",")),
        }
    }
}

/// A flag as it appeared in the command, with all of its occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    value: RawValue,
    span: Span,
}

impl Flag {
    /// Returns the raw value.
    pub fn value(&self) -> &RawValue {
        &self.value
    }

    /// Returns the span covering every occurrence of the flag.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// One container-launch command, split into flags and positionals.
#[derive(Debug, Clone)]
pub struct Invocation {
    subcommand: Subcommand,
    flags: IndexMap<String, Flag>,
    positionals: Vec<Word>,
    span: Span,
}

impl Invocation {
    /// Parse the words of one invocation.
    ///
    /// `span` covers the whole command and is used for diagnostics about
    /// the invocation as a whole.
    pub fn parse(subcommand: Subcommand, words: Vec<Word>, span: Span, registry: &FlagRegistry) -> Self {
        let mut parser = InvocationParser {
            registry,
            flags: IndexMap::new(),
        };
        let positionals = parser.parse(words);

        Self {
            subcommand,
            flags: parser.flags,
            positionals,
            span,
        }
    }

    /// Returns the subcommand that introduced the invocation.
    pub fn subcommand(&self) -> Subcommand {
        self.subcommand
    }

    /// Returns the flags in first-occurrence order, keyed by the name as
    /// written (without dashes).
    pub fn flags(&self) -> &IndexMap<String, Flag> {
        &self.flags
    }

    /// Look up a flag by name.
    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }

    /// Returns the positional words: the image, then the command.
    pub fn positionals(&self) -> &[Word] {
        &self.positionals
    }

    /// Returns the span of the whole command.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// Returns `true` if `word` would be read as a flag rather than a value.
fn looks_like_flag(word: &str) -> bool {
    word.len() > 1 && word.starts_with('-') && word.parse::<f64>().is_err()
}

/// Returns `true` for the explicit values a switch may take.
fn is_explicit_bool(word: &str) -> bool {
    matches!(word, "true" | "false")
}

struct InvocationParser<'r> {
    registry: &'r FlagRegistry,
    flags: IndexMap<String, Flag>,
}

impl InvocationParser<'_> {
    /// Consume the flags and return the positional words.
    fn parse(&mut self, words: Vec<Word>) -> Vec<Word> {
        let mut words = words.into_iter().peekable();

        while let Some(word) = words.next_if(|word| looks_like_flag(word.text())) {
            let text = word.text();
            let span = word.span();

            if text == "--" {
                break;
            }

            if let Some(long) = text.strip_prefix("--") {
                match long.split_once('=') {
                    Some((name, value)) => self.record(name, Some(value.to_string()), span),
                    None => {
                        let value = self.next_value(long, &mut words);
                        let span = value.as_ref().map_or(span, |(_, end)| span.union(*end));
                        self.record(long, value.map(|(text, _)| text), span);
                    }
                }
                continue;
            }

            let group = &text[1..];
            for (index, short) in group.char_indices() {
                let name = &group[index..index + short.len_utf8()];
                let rest = &group[index + short.len_utf8()..];

                if !rest.is_empty() && self.registry.is_switch(name) {
                    self.record(name, None, span);
                    continue;
                }

                if !rest.is_empty() {
                    let value = rest.strip_prefix('=').unwrap_or(rest);
                    self.record(name, Some(value.to_string()), span);
                } else {
                    let value = self.next_value(name, &mut words);
                    let span = value.as_ref().map_or(span, |(_, end)| span.union(*end));
                    self.record(name, value.map(|(text, _)| text), span);
                }
                break;
            }
        }

        words.collect()
    }

    /// Take the value word following flag `name`, if it gets one.
    fn next_value(
        &self,
        name: &str,
        words: &mut std::iter::Peekable<std::vec::IntoIter<Word>>,
    ) -> Option<(String, Span)> {
        let next = if self.registry.is_switch(name) {
            words.next_if(|word| is_explicit_bool(word.text()))
        } else {
            words.next_if(|word| !looks_like_flag(word.text()))
        }?;

        let span = next.span();
        Some((next.into_text(), span))
    }

    fn record(&mut self, name: &str, value: Option<String>, span: Span) {
        trace!(flag = name, value:? = value; "Parsed flag");

        match self.flags.get_mut(name) {
            Some(flag) => {
                flag.value.push(value);
                flag.span = flag.span.union(span);
            }
            None => {
                let mut raw = RawValue::Switch;
                raw.push(value);
                self.flags.insert(name.to_string(), Flag { value: raw, span });
            }
        }
    }
}
