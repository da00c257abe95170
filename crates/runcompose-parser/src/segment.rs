//! Splitting multi-command input into `docker` segments.
//!
//! Every line that begins with `docker` (after an optional `$`/`>` prompt
//! and an optional `sudo`) starts a new segment. Lines that follow without
//! that prefix are continuations of the current segment. Text before the
//! first `docker` line forms a leading segment that is never translated.

use std::fmt;

use crate::span::Span;

/// The docker subcommands that launch a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subcommand {
    /// `docker run`
    Run,
    /// `docker create`
    Create,
    /// `docker container run`
    ContainerRun,
    /// `docker service create`
    ServiceCreate,
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subcommand::Run => write!(f, "run"),
            Subcommand::Create => write!(f, "create"),
            Subcommand::ContainerRun => write!(f, "container run"),
            Subcommand::ServiceCreate => write!(f, "service create"),
        }
    }
}

/// What a segment turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A supported container-launch command.
    Invocation(Subcommand),
    /// A `docker` command that does not launch a container.
    Unsupported,
    /// Text before the first `docker` line.
    Leading,
}

/// A slice of the input belonging to one `docker` line and its
/// continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    kind: SegmentKind,
    /// For docker segments, the text after the `docker` keyword, and for
    /// invocations, after the subcommand keywords.
    text: &'a str,
    /// Offset of `text` in the source.
    offset: usize,
    span: Span,
}

impl<'a> Segment<'a> {
    /// Returns the segment kind.
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Returns the segment text.
    ///
    /// For invocations this is the argument text to tokenize.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Returns the offset of [`Segment::text`] in the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the span of the whole segment, `docker` keyword included.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns the segment text with whitespace runs collapsed to one space.
    pub fn collapsed_text(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Returns the offset just past a leading `docker` keyword on `line`, if
/// the line starts a docker segment.
fn docker_keyword_end(line: &str) -> Option<usize> {
    let mut rest = line.trim_start();

    if let Some(after_prompt) = rest.strip_prefix(['$', '>']) {
        rest = after_prompt.trim_start();
    }
    if let Some(after_sudo) = strip_word(rest, "sudo") {
        rest = after_sudo.trim_start();
    }

    let after_docker = strip_word(rest, "docker")?;
    Some(line.len() - after_docker.len())
}

/// Strip `word` from the front of `text` when it is followed by whitespace
/// or the end of the text.
fn strip_word<'t>(text: &'t str, word: &str) -> Option<&'t str> {
    let rest = text.strip_prefix(word)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

/// Classify the text following `docker`.
///
/// Returns the subcommand and the number of bytes its keywords occupy,
/// leading whitespace included.
fn classify(text: &str) -> Option<(Subcommand, usize)> {
    let rest = text.trim_start();

    let (subcommand, after) = if let Some(after) = strip_word(rest, "run") {
        (Subcommand::Run, after)
    } else if let Some(after) = strip_word(rest, "create") {
        (Subcommand::Create, after)
    } else if let Some(after) = strip_word(rest, "container") {
        (Subcommand::ContainerRun, strip_word(after.trim_start(), "run")?)
    } else if let Some(after) = strip_word(rest, "service") {
        (Subcommand::ServiceCreate, strip_word(after.trim_start(), "create")?)
    } else {
        return None;
    };

    Some((subcommand, text.len() - after.len()))
}

/// Split `source` into segments.
///
/// Blank leading text produces no segment.
///
/// # Examples
///
/// ```
/// use runcompose_parser::segment::{self, SegmentKind, Subcommand};
///
/// let segments = segment::split("docker run -p 80:80 nginx\ndocker ps\n");
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].kind(), SegmentKind::Invocation(Subcommand::Run));
/// assert_eq!(segments[0].text().trim(), "-p 80:80 nginx");
/// assert_eq!(segments[1].kind(), SegmentKind::Unsupported);
/// ```
pub fn split(source: &str) -> Vec<Segment<'_>> {
    // (start of the segment, start of the text after `docker`)
    let mut starts: Vec<(usize, Option<usize>)> = vec![(0, None)];

    let mut line_start = 0;
    for line in source.split_inclusive('\n') {
        if let Some(keyword_end) = docker_keyword_end(line) {
            starts.push((line_start, Some(line_start + keyword_end)));
        }
        line_start += line.len();
    }

    let mut segments = Vec::with_capacity(starts.len());
    for (index, &(start, body)) in starts.iter().enumerate() {
        let end = starts
            .get(index + 1)
            .map_or(source.len(), |&(next_start, _)| next_start);
        let span = Span::new(start..end);

        let Some(body) = body else {
            let text = &source[start..end];
            if !text.trim().is_empty() {
                segments.push(Segment {
                    kind: SegmentKind::Leading,
                    text,
                    offset: start,
                    span,
                });
            }
            continue;
        };

        let text = &source[body..end];
        let segment = match classify(text) {
            Some((subcommand, keywords_len)) => Segment {
                kind: SegmentKind::Invocation(subcommand),
                text: &text[keywords_len..],
                offset: body + keywords_len,
                span,
            },
            None => Segment {
                kind: SegmentKind::Unsupported,
                text,
                offset: body,
                span,
            },
        };
        segments.push(segment);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SegmentKind> {
        split(source).iter().map(Segment::kind).collect()
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(
            kinds(
                "docker run a\ndocker create b\ndocker container run c\n\
                 docker service   create d\ndocker container ls\n"
            ),
            vec![
                SegmentKind::Invocation(Subcommand::Run),
                SegmentKind::Invocation(Subcommand::Create),
                SegmentKind::Invocation(Subcommand::ContainerRun),
                SegmentKind::Invocation(Subcommand::ServiceCreate),
                SegmentKind::Unsupported,
            ]
        );
    }

    #[test]
    fn test_subcommand_must_be_whole_word() {
        assert_eq!(kinds("docker runner x"), vec![SegmentKind::Unsupported]);
        assert_eq!(kinds("dockerd run x"), vec![SegmentKind::Leading]);
    }

    #[test]
    fn test_continuation_lines_join_segment() {
        let segments = split("docker run \\\n  -p 80:80 \\\n  nginx\ndocker run redis");

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].collapsed_text(), "\\ -p 80:80 \\ nginx");
        assert_eq!(segments[1].text().trim(), "redis");
    }

    #[test]
    fn test_prompt_and_sudo() {
        assert_eq!(
            kinds("$ docker run a\n> sudo docker run b\n  sudo docker ps"),
            vec![
                SegmentKind::Invocation(Subcommand::Run),
                SegmentKind::Invocation(Subcommand::Run),
                SegmentKind::Unsupported,
            ]
        );
    }

    #[test]
    fn test_leading_text() {
        let segments = split("# start the proxy\ndocker run nginx");

        assert_eq!(segments[0].kind(), SegmentKind::Leading);
        assert_eq!(segments[0].collapsed_text(), "# start the proxy");
        assert_eq!(
            segments[1].kind(),
            SegmentKind::Invocation(Subcommand::Run)
        );
    }

    #[test]
    fn test_blank_leading_text_is_skipped() {
        assert_eq!(
            kinds("\n   \ndocker run nginx"),
            vec![SegmentKind::Invocation(Subcommand::Run)]
        );
    }

    #[test]
    fn test_offsets_point_into_source() {
        let source = "docker run -p 80:80 nginx\n  docker container run redis";
        for segment in split(source) {
            assert_eq!(
                &source[segment.offset()..segment.offset() + segment.text().len()],
                segment.text()
            );
        }

        let segments = split(source);
        assert_eq!(segments[1].span().start(), 26);
        assert_eq!(segments[1].span().end(), source.len());
    }
}
