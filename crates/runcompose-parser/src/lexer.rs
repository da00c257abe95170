//! Shell-style word splitting for docker command arguments.
//!
//! The lexer turns the argument text of one invocation into [`Word`]s,
//! following the quoting rules of a POSIX shell closely enough for
//! copy-pasted `docker run` commands:
//!
//! - whitespace separates words, and a backslash before whitespace (a line
//!   continuation) is a separator too,
//! - single quotes keep their content literally,
//! - double quotes honor the `\"`, `\\`, `\$` and `` \` `` escapes and drop
//!   escaped newlines,
//! - outside quotes a backslash escapes the next character,
//! - `$(...)` command substitutions stay a single word, inner whitespace
//!   included.
//!
//! The public entry point is [`tokenize`], which reports every unterminated
//! quote or substitution it finds before failing. [`quote`] goes the other
//! way and writes a word back as text that tokenizes to that word.

use std::borrow::Cow;

use winnow::{
    Parser as _,
    ascii::multispace1,
    combinator::{alt, cut_err, empty, eof, fail, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// One shell word with quoting already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    text: String,
    span: Span,
}

impl Word {
    /// Create a new word.
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// Returns the unquoted text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the location of the quoted text in the source.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Consumes the word and returns its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: &'static str,
    label: &'static str,
    /// Offset of the opening quote or `$(`.
    start: usize,
}

/// Parentheses allowed open at once inside one `$(...)`.
const MAX_SUBSTITUTION_DEPTH: usize = 32;

const UNCLOSED: &str = "opened here and never closed";

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse `'...'`. The content is taken literally.
fn single_quoted<'a>(input: &mut Input<'a>) -> IResult<'a, Cow<'a, str>> {
    let start = input.current_token_start();

    preceded(
        '\'',
        cut_err(terminated(take_while(0.., |c: char| c != '\''), '\'')).context(
            LexerDiagnostic {
                code: ErrorCode::E001,
                message: "unterminated single quote",
                help: "add a closing `'`",
                label: UNCLOSED,
                start,
            },
        ),
    )
    .map(Cow::Borrowed)
    .parse_next(input)
}

/// Parse one character of double-quoted content.
///
/// Returns `None` for an escaped newline, which is removed.
fn double_quoted_char<'a>(input: &mut Input<'a>) -> IResult<'a, Option<char>> {
    alt((
        preceded(
            '\\',
            alt((
                one_of(['"', '\\', '$', '`']).map(Some),
                '\n'.value(None),
                empty.value(Some('\\')),
            )),
        ),
        none_of(['"', '\\']).map(Some),
    ))
    .parse_next(input)
}

/// Parse `"..."`.
fn double_quoted<'a>(input: &mut Input<'a>) -> IResult<'a, Cow<'a, str>> {
    let start = input.current_token_start();

    let content = repeat(0.., double_quoted_char).fold(String::new, |mut acc, ch| {
        if let Some(ch) = ch {
            acc.push(ch);
        }
        acc
    });

    preceded(
        '"',
        cut_err(terminated(content, '"')).context(LexerDiagnostic {
            code: ErrorCode::E002,
            message: "unterminated double quote",
            help: "add a closing `\"`",
            label: UNCLOSED,
            start,
        }),
    )
    .map(Cow::Owned)
    .parse_next(input)
}

/// Parse the inside of a command substitution, balancing parentheses.
///
/// Stops before the `)` that closes the substitution, or at the end of the
/// input when it is never closed.
fn substitution_body<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    let mut depth = 0usize;
    while let Some(ch) = input.peek_token() {
        match ch {
            '(' if depth == MAX_SUBSTITUTION_DEPTH => {
                let start = input.current_token_start();
                return cut_err(fail::<_, (), _>.context(LexerDiagnostic {
                    code: ErrorCode::E004,
                    message: "command substitution nested too deeply",
                    help: "flatten the nested `$(...)` or `(...)` groups",
                    label: "nesting limit reached here",
                    start,
                }))
                .parse_next(input);
            }
            '(' => depth += 1,
            ')' if depth == 0 => break,
            ')' => depth -= 1,
            _ => {}
        }
        input.next_token();
    }
    Ok(())
}

/// Parse `$(...)`, keeping the raw text.
fn substitution<'a>(input: &mut Input<'a>) -> IResult<'a, Cow<'a, str>> {
    let start = input.current_token_start();

    preceded(
        "$(",
        cut_err(terminated(substitution_body, ')')).context(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "unterminated command substitution",
            help: "balance the parentheses of `$(...)`",
            label: UNCLOSED,
            start,
        }),
    )
    .take()
    .map(Cow::Borrowed)
    .parse_next(input)
}

/// Parse a backslash escape outside of quotes.
fn escaped<'a>(input: &mut Input<'a>) -> IResult<'a, Cow<'a, str>> {
    preceded('\\', none_of(|c: char| c.is_whitespace()))
        .map(|ch: char| Cow::Owned(ch.to_string()))
        .parse_next(input)
}

/// Parse unquoted text up to the next quote, escape or `$`.
fn bare<'a>(input: &mut Input<'a>) -> IResult<'a, Cow<'a, str>> {
    alt((
        take_while(1.., |c: char| {
            !c.is_whitespace() && !matches!(c, '\'' | '"' | '\\' | '$')
        }),
        "$",
    ))
    .map(Cow::Borrowed)
    .parse_next(input)
}

/// Parse a word: adjacent quoted and unquoted pieces glued together.
fn word<'a>(input: &mut Input<'a>) -> IResult<'a, String> {
    repeat(
        1..,
        alt((single_quoted, double_quoted, substitution, escaped, bare)),
    )
    .fold(String::new, |mut acc, piece: Cow<'a, str>| {
        acc.push_str(&piece);
        acc
    })
    .parse_next(input)
}

/// Parse whitespace or a backslash line continuation.
fn separator<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    alt((
        multispace1.void(),
        terminated('\\', peek(alt((multispace1.void(), eof.void())))).void(),
    ))
    .parse_next(input)
}

/// Lexer that accumulates words and diagnostics.
struct Lexer {
    words: Vec<Word>,
    diagnostics: DiagnosticCollector,
    /// Offset of the lexed text within the complete source.
    base: usize,
    len: usize,
}

impl Lexer {
    fn new(base: usize, len: usize) -> Self {
        Self {
            words: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            base,
            len,
        }
    }

    fn tokenize(&mut self, mut input: Input<'_>) {
        loop {
            let _: IResult<'_, ()> = repeat(0.., separator).parse_next(&mut input);
            if input.is_empty() {
                break;
            }

            let start = input.current_token_start();
            match word(&mut input) {
                Ok(text) => {
                    let end = input.current_token_start();
                    let span = Span::new(start..end).offset_by(self.base);
                    self.words.push(Word::new(text, span));
                }
                Err(ErrMode::Cut(err)) => {
                    // An unterminated construct runs to the end of the text.
                    let diagnostic = self.convert_error(&err, self.len);
                    self.diagnostics.emit(diagnostic);
                    break;
                }
                Err(err) => {
                    let error_pos = input.current_token_start();
                    let context = match err {
                        ErrMode::Backtrack(ctx) => ctx,
                        _ => ContextError::new(),
                    };
                    let diagnostic = self.convert_error(&context, error_pos);
                    self.diagnostics.emit(diagnostic);
                    if input.next_token().is_none() {
                        break;
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<Word>, ParseError> {
        self.diagnostics.finish().map(|()| self.words)
    }

    fn convert_error(&self, err: &ContextError<LexerDiagnostic>, error_pos: usize) -> Diagnostic {
        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            label,
            start,
        }) = err.context().next()
        {
            let span = Span::new(*start..error_pos).offset_by(self.base);
            return Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, *label)
                .with_help(*help);
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1)).offset_by(self.base);
        Diagnostic::error("unexpected character").with_label(span, "could not be read")
    }
}

/// Split `text` into shell words.
///
/// `base` is the offset of `text` within the complete source and is added to
/// every span.
///
/// # Errors
///
/// Returns every unterminated quote (`E001`, `E002`) or command substitution
/// (`E003`) found in `text`, and substitutions nested too deeply (`E004`).
pub fn tokenize(text: &str, base: usize) -> Result<Vec<Word>, ParseError> {
    let mut lexer = Lexer::new(base, text.len());
    lexer.tokenize(LocatingSlice::new(text));
    lexer.finish()
}

/// Write `word` so that a shell, or [`tokenize`], reads it back unchanged.
///
/// Words without whitespace or shell syntax are returned as they are. Others
/// are single-quoted, with embedded `'` written as `'\''`.
///
/// ```
/// use runcompose_parser::lexer::quote;
///
/// assert_eq!(quote("nginx:latest"), "nginx:latest");
/// assert_eq!(quote("echo hi"), "'echo hi'");
/// assert_eq!(quote("it's"), r"'it'\''s'");
/// ```
pub fn quote(word: &str) -> Cow<'_, str> {
    let plain = !word.is_empty()
        && !word.chars().any(|c| {
            c.is_whitespace()
                || matches!(
                    c,
                    '\'' | '"' | '\\' | '$' | '`' | ';' | '&' | '|' | '<' | '>' | '(' | ')'
                        | '*' | '?' | '[' | ']' | '{' | '}' | '#' | '~' | '!'
                )
        });
    if plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokenize(text, 0)
            .unwrap()
            .into_iter()
            .map(Word::into_text)
            .collect()
    }

    fn error_codes(text: &str) -> Vec<ErrorCode> {
        tokenize(text, 0)
            .unwrap_err()
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_whitespace_separates_words() {
        assert_eq!(
            words("  -p 80:80\t\tnginx  "),
            vec!["-p", "80:80", "nginx"]
        );
    }

    #[test]
    fn test_line_continuations() {
        assert_eq!(
            words("-p 80:80 \\\n  -v data:/data \\\n  nginx"),
            vec!["-p", "80:80", "-v", "data:/data", "nginx"]
        );
        assert_eq!(words("nginx \\"), vec!["nginx"]);
    }

    #[test]
    fn test_single_quotes_are_literal() {
        assert_eq!(words(r#"-e 'A=$HOME "x"' img"#), vec![r#"A=$HOME "x""#, "img"]);
        assert_eq!(words("''"), vec![""]);
    }

    #[test]
    fn test_double_quote_escapes() {
        assert_eq!(words(r#""a \"b\" \\ \$c \d""#), vec![r#"a "b" \ $c \d"#]);
        assert_eq!(words("\"one\\\ntwo\""), vec!["onetwo"]);
    }

    #[test]
    fn test_adjacent_pieces_join() {
        assert_eq!(
            words(r#"--label=com.example="my app" img"#),
            vec!["--label=com.example=my app", "img"]
        );
    }

    #[test]
    fn test_backslash_escape_outside_quotes() {
        assert_eq!(words(r"a\ b c"), vec!["a b", "c"]);
    }

    #[test]
    fn test_command_substitution() {
        assert_eq!(
            words("-v $(pwd)/data:/data -u $(id -u $(whoami)) img"),
            vec!["-v", "$(pwd)/data:/data", "-u", "$(id -u $(whoami))", "img"]
        );
        assert_eq!(words("$HOME:/root"), vec!["$HOME:/root"]);
    }

    #[test]
    fn test_word_spans() {
        let words = tokenize("-p  '80:80'", 10).unwrap();
        assert_eq!(words[0].span().range(), 10..12);
        assert_eq!(words[1].span().range(), 14..21);
    }

    #[test]
    fn test_unterminated_constructs() {
        assert_eq!(error_codes("-e 'oops"), vec![ErrorCode::E001]);
        assert_eq!(error_codes("-e \"oops"), vec![ErrorCode::E002]);
        assert_eq!(error_codes("-v $(pwd:/data"), vec![ErrorCode::E003]);
    }

    #[test]
    fn test_deep_substitution_is_rejected() {
        let nest = |depth: usize| format!("-v {}{}", "$(".repeat(depth), ")".repeat(depth));
        assert_eq!(tokenize(&nest(MAX_SUBSTITUTION_DEPTH + 1), 0).unwrap().len(), 2);
        assert_eq!(error_codes(&nest(MAX_SUBSTITUTION_DEPTH + 2)), vec![ErrorCode::E004]);

        let pathological = "$(".repeat(100_000);
        assert_eq!(error_codes(&pathological), vec![ErrorCode::E004]);

        let nested = format!("{}{}", "$(".repeat(8), ")".repeat(8));
        assert_eq!(words(&nested), vec![nested.clone()]);
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("--api.insecure=true"), "--api.insecure=true");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("echo hi"), "'echo hi'");
        assert_eq!(quote("$(pwd)"), "'$(pwd)'");
        assert_eq!(quote("a'b"), r"'a'\''b'");
        assert_eq!(words(&quote("a'b")), vec!["a'b"]);
    }

    #[test]
    fn test_unterminated_span_starts_at_quote() {
        let err = tokenize("img 'abc", 5).unwrap_err();
        let label = &err.diagnostics()[0].labels()[0];
        assert_eq!(label.span().start(), 9);
        assert_eq!(label.span().end(), 13);
    }

    proptest::proptest! {
        #[test]
        fn test_quoted_word_reads_back(word in "[ -~\t\n]{0,24}") {
            let read_back = words(&quote(&word));
            proptest::prop_assert_eq!(read_back, vec![word]);
        }

        #[test]
        fn test_quoted_words_survive(raw in proptest::collection::vec("[a-z0-9:=/._ -]{0,12}", 1..8)) {
            let source = raw
                .iter()
                .map(|word| format!("'{word}'"))
                .collect::<Vec<_>>()
                .join(" ");

            let tokens = tokenize(&source, 3).unwrap();
            let texts: Vec<_> = tokens.iter().map(Word::text).collect();
            proptest::prop_assert_eq!(&texts, &raw);

            for (token, word) in tokens.iter().zip(&raw) {
                let range = token.span().range();
                proptest::prop_assert_eq!(&source[range.start - 3..range.end - 3], format!("'{word}'"));
            }
        }
    }
}
