//! Trivia-preserving Kotlin lexer
//!
//! The lexer produces a flat, gapless token sequence: token *i* ends exactly
//! where token *i+1* starts and the last token ends at the source length, so
//! concatenating all token texts reproduces the input byte for byte. All
//! trivia (whitespace, newlines, comments) are real tokens; this is what the
//! tree reconstructor relies on when it scans gaps for elided parentheses.
//!
//! Lexing is total. Unrecognized characters become single-char `Unknown`
//! tokens, and unterminated constructs (strings, block comments) lex to a
//! token reaching end of input plus a recorded [`LexError`]. There is no fail
//! path; malformed input is the consumer's problem.

use crate::psi::{KtSyntaxKind, SourceRange};

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub range: SourceRange,
}

impl LexError {
    pub fn new(message: impl Into<String>, range: SourceRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// A token with its kind, exact source range, and literal text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub range: SourceRange,
    pub kind: KtSyntaxKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: KtSyntaxKind, text: impl Into<String>, range: SourceRange) -> Self {
        Self {
            range,
            kind,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | Type: {} | Text: \"{}\"",
            self.range,
            self.kind,
            self.text.replace('\n', "\\n")
        )
    }
}

/// Result returned by the lexer
pub type LexResult = (Vec<Token>, Vec<LexError>);

fn next_char(input: &str, at: usize) -> Option<(char, usize)> {
    input[at..].chars().next().map(|c| (c, c.len_utf8()))
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn keyword_kind(text: &str) -> Option<KtSyntaxKind> {
    use KtSyntaxKind::*;
    Some(match text {
        "package" => PackageKw,
        "import" => ImportKw,
        "class" => ClassKw,
        "interface" => InterfaceKw,
        "object" => ObjectKw,
        "fun" => FunKw,
        "val" => ValKw,
        "var" => VarKw,
        "typealias" => TypealiasKw,
        "constructor" => ConstructorKw,
        "init" => InitKw,
        "companion" => CompanionKw,
        "this" => ThisKw,
        "super" => SuperKw,
        "if" => IfKw,
        "else" => ElseKw,
        "when" => WhenKw,
        "for" => ForKw,
        "while" => WhileKw,
        "do" => DoKw,
        "try" => TryKw,
        "catch" => CatchKw,
        "finally" => FinallyKw,
        "return" => ReturnKw,
        "throw" => ThrowKw,
        "break" => BreakKw,
        "continue" => ContinueKw,
        "as" => AsKw,
        "is" => IsKw,
        "in" => InKw,
        "null" => NullKw,
        "true" => TrueKw,
        "false" => FalseKw,
        _ => return None,
    })
}

/// Lex Kotlin source, preserving all trivia
pub fn tokenize(input: &str) -> LexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    let len = input.len();
    let mut i = 0usize;

    while i < len {
        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        match current {
            '\n' => {
                tokens.push(token(input, KtSyntaxKind::Newline, start, i + size));
                i += size;
            }
            '\r' => {
                // \r\n counts as one newline token
                let mut end = i + size;
                if let Some(('\n', nl_size)) = next_char(input, end) {
                    end += nl_size;
                }
                tokens.push(token(input, KtSyntaxKind::Newline, start, end));
                i = end;
            }
            c if c.is_whitespace() => {
                let mut end = i + size;
                while let Some((next, step)) = next_char(input, end) {
                    if next.is_whitespace() && next != '\n' && next != '\r' {
                        end += step;
                    } else {
                        break;
                    }
                }
                tokens.push(token(input, KtSyntaxKind::Whitespace, start, end));
                i = end;
            }
            '/' => {
                match next_char(input, i + size) {
                    Some(('/', second)) => {
                        let mut end = i + size + second;
                        while let Some((c, step)) = next_char(input, end) {
                            if c == '\n' {
                                break;
                            }
                            end += step;
                        }
                        tokens.push(token(input, KtSyntaxKind::CommentLine, start, end));
                        i = end;
                    }
                    Some(('*', second)) => {
                        // Kotlin block comments nest
                        let mut end = i + size + second;
                        let mut depth = 1usize;
                        while depth > 0 {
                            match next_char(input, end) {
                                Some(('*', step)) => {
                                    if let Some(('/', step2)) = next_char(input, end + step) {
                                        depth -= 1;
                                        end += step + step2;
                                    } else {
                                        end += step;
                                    }
                                }
                                Some(('/', step)) => {
                                    if let Some(('*', step2)) = next_char(input, end + step) {
                                        depth += 1;
                                        end += step + step2;
                                    } else {
                                        end += step;
                                    }
                                }
                                Some((_, step)) => end += step,
                                None => {
                                    errors.push(LexError::new(
                                        "unterminated block comment",
                                        SourceRange::new(start, end),
                                    ));
                                    break;
                                }
                            }
                        }
                        tokens.push(token(input, KtSyntaxKind::CommentBlock, start, end));
                        i = end;
                    }
                    Some(('=', second)) => {
                        tokens.push(token(input, KtSyntaxKind::DivEq, start, i + size + second));
                        i += size + second;
                    }
                    _ => {
                        tokens.push(token(input, KtSyntaxKind::Div, start, i + size));
                        i += size;
                    }
                }
            }
            '"' => {
                let (end, error) = lex_string(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                tokens.push(token(input, KtSyntaxKind::StringLiteral, start, end));
                i = end;
            }
            '\'' => {
                let (end, error) = lex_char_literal(input, start);
                if let Some(err) = error {
                    errors.push(err);
                }
                tokens.push(token(input, KtSyntaxKind::CharacterLiteral, start, end));
                i = end;
            }
            '`' => {
                // Escaped identifier: `anything but backtick or newline`
                let mut end = i + size;
                let mut closed = false;
                while let Some((c, step)) = next_char(input, end) {
                    end += step;
                    if c == '`' {
                        closed = true;
                        break;
                    }
                    if c == '\n' {
                        break;
                    }
                }
                if !closed {
                    errors.push(LexError::new(
                        "unterminated escaped identifier",
                        SourceRange::new(start, end),
                    ));
                }
                tokens.push(token(input, KtSyntaxKind::Identifier, start, end));
                i = end;
            }
            c if c.is_ascii_digit() => {
                let end = lex_number(input, start);
                let text = &input[start..end];
                let radix_prefixed = text.len() >= 2
                    && text.starts_with('0')
                    && matches!(text.as_bytes()[1], b'x' | b'X' | b'b' | b'B');
                let kind = if !radix_prefixed
                    && (text.contains('.')
                        || text.contains('e')
                        || text.contains('E')
                        || text.ends_with('f')
                        || text.ends_with('F'))
                {
                    KtSyntaxKind::FloatLiteral
                } else {
                    KtSyntaxKind::IntegerLiteral
                };
                tokens.push(token(input, kind, start, end));
                i = end;
            }
            c if is_ident_start(c) => {
                let mut end = i + size;
                while let Some((next, step)) = next_char(input, end) {
                    if is_ident_continue(next) {
                        end += step;
                    } else {
                        break;
                    }
                }
                let text = &input[start..end];
                let kind = keyword_kind(text).unwrap_or(KtSyntaxKind::Identifier);
                tokens.push(token(input, kind, start, end));
                i = end;
            }
            _ => {
                let (kind, width) = lex_operator(input, start, current, size);
                tokens.push(token(input, kind, start, start + width));
                i += width;
            }
        }
    }

    (tokens, errors)
}

fn token(input: &str, kind: KtSyntaxKind, start: usize, end: usize) -> Token {
    Token::new(kind, &input[start..end], SourceRange::new(start, end))
}

/// Lex a string literal starting at `start`; handles both escaped strings and
/// raw `"""` strings. Returns the end offset and an error for unterminated
/// input.
fn lex_string(input: &str, start: usize) -> (usize, Option<LexError>) {
    if input[start..].starts_with("\"\"\"") {
        let mut end = start + 3;
        while end < input.len() {
            if input[end..].starts_with("\"\"\"") {
                end += 3;
                // Raw strings may end in extra quotes: """ ... """"
                while let Some(('"', step)) = next_char(input, end) {
                    end += step;
                }
                return (end, None);
            }
            let Some((_, step)) = next_char(input, end) else {
                break;
            };
            end += step;
        }
        return (
            input.len(),
            Some(LexError::new(
                "unterminated raw string",
                SourceRange::new(start, input.len()),
            )),
        );
    }

    let mut end = start + 1;
    while let Some((c, step)) = next_char(input, end) {
        match c {
            '"' => return (end + step, None),
            '\n' => break,
            '\\' => {
                end += step;
                if let Some((_, esc)) = next_char(input, end) {
                    end += esc;
                }
            }
            _ => end += step,
        }
    }
    (
        end,
        Some(LexError::new(
            "unterminated string literal",
            SourceRange::new(start, end),
        )),
    )
}

fn lex_char_literal(input: &str, start: usize) -> (usize, Option<LexError>) {
    let mut end = start + 1;
    while let Some((c, step)) = next_char(input, end) {
        match c {
            '\'' => return (end + step, None),
            '\n' => break,
            '\\' => {
                end += step;
                if let Some((_, esc)) = next_char(input, end) {
                    end += esc;
                }
            }
            _ => end += step,
        }
    }
    (
        end,
        Some(LexError::new(
            "unterminated character literal",
            SourceRange::new(start, end),
        )),
    )
}

fn lex_number(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let len = input.len();
    let mut end = start;

    if input[start..].starts_with("0x") || input[start..].starts_with("0X") {
        end += 2;
        while end < len && (bytes[end].is_ascii_hexdigit() || bytes[end] == b'_') {
            end += 1;
        }
        if end < len && (bytes[end] == b'L' || bytes[end] == b'l') {
            end += 1;
        }
        return end;
    }
    if input[start..].starts_with("0b") || input[start..].starts_with("0B") {
        end += 2;
        while end < len && (bytes[end] == b'0' || bytes[end] == b'1' || bytes[end] == b'_') {
            end += 1;
        }
        if end < len && (bytes[end] == b'L' || bytes[end] == b'l') {
            end += 1;
        }
        return end;
    }

    while end < len && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
        end += 1;
    }
    // Fraction only when a digit follows the dot, so `1..10` stays two ints
    if end + 1 < len && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < len && (bytes[end].is_ascii_digit() || bytes[end] == b'_') {
            end += 1;
        }
    }
    if end < len && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < len && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < len && bytes[exp].is_ascii_digit() {
            end = exp;
            while end < len && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
    }
    if end < len && (bytes[end] == b'f' || bytes[end] == b'F' || bytes[end] == b'L') {
        end += 1;
    }
    end
}

/// Longest-match operator lexing; anything unrecognized becomes a
/// single-char Unknown token.
fn lex_operator(input: &str, at: usize, current: char, size: usize) -> (KtSyntaxKind, usize) {
    use KtSyntaxKind::*;
    let peek = |offset: usize| next_char(input, at + offset).map(|(c, _)| c);

    match current {
        '(' => (LParen, 1),
        ')' => (RParen, 1),
        '{' => (LBrace, 1),
        '}' => (RBrace, 1),
        '[' => (LBracket, 1),
        ']' => (RBracket, 1),
        ',' => (Comma, 1),
        ';' => (Semicolon, 1),
        '@' => (At, 1),
        '.' => match peek(1) {
            Some('.') => match peek(2) {
                Some('<') => (RangeUntil, 3),
                _ => (Range, 2),
            },
            _ => (Dot, 1),
        },
        ':' => match peek(1) {
            Some(':') => (ColonColon, 2),
            _ => (Colon, 1),
        },
        '?' => match peek(1) {
            Some(':') => (Elvis, 2),
            Some('.') => (SafeAccess, 2),
            _ => (Question, 1),
        },
        '=' => match peek(1) {
            Some('=') => match peek(2) {
                Some('=') => (EqEqEq, 3),
                _ => (EqEq, 2),
            },
            _ => (Eq, 1),
        },
        '!' => match peek(1) {
            Some('=') => match peek(2) {
                Some('=') => (ExclEqEq, 3),
                _ => (ExclEq, 2),
            },
            Some('!') => (ExclExcl, 2),
            Some('i') => {
                // `!in` and `!is` are single tokens, as in the Kotlin lexer
                if input[at..].starts_with("!in") && !followed_by_ident(input, at + 3) {
                    (NotIn, 3)
                } else if input[at..].starts_with("!is") && !followed_by_ident(input, at + 3) {
                    (NotIs, 3)
                } else {
                    (Excl, 1)
                }
            }
            _ => (Excl, 1),
        },
        '<' => match peek(1) {
            Some('=') => (LtEq, 2),
            _ => (Lt, 1),
        },
        '>' => match peek(1) {
            Some('=') => (GtEq, 2),
            _ => (Gt, 1),
        },
        '+' => match peek(1) {
            Some('+') => (PlusPlus, 2),
            Some('=') => (PlusEq, 2),
            _ => (Plus, 1),
        },
        '-' => match peek(1) {
            Some('-') => (MinusMinus, 2),
            Some('=') => (MinusEq, 2),
            Some('>') => (Arrow, 2),
            _ => (Minus, 1),
        },
        '*' => match peek(1) {
            Some('=') => (MulEq, 2),
            _ => (Mul, 1),
        },
        '%' => match peek(1) {
            Some('=') => (PercEq, 2),
            _ => (Perc, 1),
        },
        '&' => match peek(1) {
            Some('&') => (AndAnd, 2),
            _ => (Unknown, size),
        },
        '|' => match peek(1) {
            Some('|') => (OrOr, 2),
            _ => (Unknown, size),
        },
        _ => (Unknown, size),
    }
}

fn followed_by_ident(input: &str, at: usize) -> bool {
    next_char(input, at).is_some_and(|(c, _)| is_ident_continue(c))
}
