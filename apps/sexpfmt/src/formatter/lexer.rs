//! Tokenizer for s-expression sources.
//!
//! Every input character lands in exactly one token, so rendering an
//! untouched token stream reproduces the source byte-for-byte. Delimiter
//! balance is verified while lexing; this is the only "parse" the formatter
//! needs.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `(`, `[`, `{`, `#(`, `#{`, `#?(`, `#?@(`
    Open,
    Close,
    /// String or regex literal, possibly spanning lines.
    Str,
    /// `;` up to (not including) the line break.
    Comment,
    /// Run of spaces and tabs.
    Space,
    /// Run of commas; neither whitespace nor a form.
    Comma,
    Newline,
    /// Symbol, keyword, number, character literal or tagged-literal tag.
    Atom,
    /// Reader prefix that attaches to the following form(s): `'`, `` ` ``,
    /// `~`, `~@`, `@`, `^`, `#'`, `#_`, `#^`, `#=`, `#:ns`.
    Prefix,
}

impl TokenKind {
    pub fn starts_form(self) -> bool {
        matches!(
            self,
            TokenKind::Open | TokenKind::Str | TokenKind::Atom | TokenKind::Prefix
        )
    }

    pub fn ends_form(self) -> bool {
        matches!(self, TokenKind::Close | TokenKind::Str | TokenKind::Atom)
    }

    pub fn is_whitespace(self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Newline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based source position of the first character.
    pub line: usize,
    pub col: usize,
}

impl Token {
    pub fn space(width: usize) -> Self {
        Token {
            kind: TokenKind::Space,
            text: " ".repeat(width),
            line: 0,
            col: 0,
        }
    }

    /// Number of characters after the last line break in this token, or the
    /// full width when it has none.
    pub fn trailing_width(&self) -> Option<usize> {
        self.text
            .rfind('\n')
            .map(|pos| self.text[pos + 1..].chars().count())
    }

    pub fn width(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected `{found}` at line {line}, column {col}")]
    UnexpectedClose { found: char, line: usize, col: usize },

    #[error(
        "mismatched `{found}` at line {line}, column {col}; `{open}` opened at line {open_line}, column {open_col}"
    )]
    Mismatched {
        found: char,
        open: String,
        line: usize,
        col: usize,
        open_line: usize,
        open_col: usize,
    },

    #[error("unclosed `{open}` opened at line {line}, column {col}")]
    Unclosed { open: String, line: usize, col: usize },

    #[error("unterminated string starting at line {line}, column {col}")]
    UnterminatedString { line: usize, col: usize },
}

struct OpenDelim {
    close: char,
    text: String,
    line: usize,
    col: usize,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';')
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn is_space_at(chars: &[char], i: usize) -> bool {
    match chars[i] {
        ' ' | '\t' => true,
        '\r' => chars.get(i + 1) != Some(&'\n'),
        _ => false,
    }
}

fn is_line_break_at(chars: &[char], i: usize) -> bool {
    chars[i] == '\n' || (chars[i] == '\r' && chars.get(i + 1) == Some(&'\n'))
}

/// Consume a string body starting just after its opening quote.
fn scan_string(chars: &[char], mut i: usize, line: usize, col: usize) -> Result<usize, ParseError> {
    loop {
        match chars.get(i) {
            None => return Err(ParseError::UnterminatedString { line, col }),
            Some('\\') => i += 2,
            Some('"') => return Ok(i + 1),
            Some(_) => i += 1,
        }
    }
}

fn scan_atom(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && !is_delimiter(chars[i]) {
        i += 1;
    }
    i
}

/// Split `source` into tokens, verifying delimiter balance.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut stack: Vec<OpenDelim> = Vec::new();
    let (mut i, mut line, mut col) = (0usize, 1usize, 1usize);

    while i < chars.len() {
        let start = i;
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let kind = match c {
            '\n' => {
                i += 1;
                TokenKind::Newline
            }
            '\r' if next == Some('\n') => {
                i += 2;
                TokenKind::Newline
            }
            ' ' | '\t' | '\r' => {
                while i < chars.len() && is_space_at(&chars, i) {
                    i += 1;
                }
                TokenKind::Space
            }
            ',' => {
                while i < chars.len() && chars[i] == ',' {
                    i += 1;
                }
                TokenKind::Comma
            }
            ';' => {
                while i < chars.len() && !is_line_break_at(&chars, i) {
                    i += 1;
                }
                TokenKind::Comment
            }
            '"' => {
                i = scan_string(&chars, i + 1, line, col)?;
                TokenKind::Str
            }
            '(' | '[' | '{' => {
                i += 1;
                stack.push(OpenDelim {
                    close: closing_for(c),
                    text: c.to_string(),
                    line,
                    col,
                });
                TokenKind::Open
            }
            ')' | ']' | '}' => {
                match stack.pop() {
                    None => {
                        return Err(ParseError::UnexpectedClose { found: c, line, col });
                    }
                    Some(open) if open.close != c => {
                        return Err(ParseError::Mismatched {
                            found: c,
                            open: open.text,
                            line,
                            col,
                            open_line: open.line,
                            open_col: open.col,
                        });
                    }
                    Some(_) => {}
                }
                i += 1;
                TokenKind::Close
            }
            '\\' => {
                // character literal: `\a`, `\(`, `\newline`, `A`
                i += 1;
                if let Some(&first) = chars.get(i) {
                    i += 1;
                    if first.is_alphanumeric() {
                        while i < chars.len() && chars[i].is_alphanumeric() {
                            i += 1;
                        }
                    }
                }
                TokenKind::Atom
            }
            '#' => match next {
                Some('(') | Some('{') => {
                    i += 2;
                    let open = chars[i - 1];
                    stack.push(OpenDelim {
                        close: closing_for(open),
                        text: format!("#{open}"),
                        line,
                        col,
                    });
                    TokenKind::Open
                }
                Some('"') => {
                    i = scan_string(&chars, i + 2, line, col)?;
                    TokenKind::Str
                }
                Some('?') => {
                    let splice = chars.get(i + 2) == Some(&'@');
                    let paren_at = if splice { i + 3 } else { i + 2 };
                    if chars.get(paren_at) == Some(&'(') {
                        i = paren_at + 1;
                        stack.push(OpenDelim {
                            close: ')',
                            text: chars[start..i].iter().collect(),
                            line,
                            col,
                        });
                        TokenKind::Open
                    } else {
                        i = scan_atom(&chars, i + 1);
                        TokenKind::Atom
                    }
                }
                Some('_') | Some('\'') | Some('^') | Some('=') => {
                    i += 2;
                    TokenKind::Prefix
                }
                Some(':') => {
                    i = scan_atom(&chars, i + 2);
                    TokenKind::Prefix
                }
                _ => {
                    i = scan_atom(&chars, i + 1);
                    TokenKind::Atom
                }
            },
            '\'' | '`' | '@' | '^' => {
                i += 1;
                TokenKind::Prefix
            }
            '~' => {
                i += if next == Some('@') { 2 } else { 1 };
                TokenKind::Prefix
            }
            _ => {
                i = scan_atom(&chars, i + 1);
                TokenKind::Atom
            }
        };

        let text: String = chars[start..i].iter().collect();
        tokens.push(Token {
            kind,
            text,
            line,
            col,
        });
        for &ch in &chars[start..i] {
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed {
            open: open.text,
            line: open.line,
            col: open.col,
        });
    }
    Ok(tokens)
}

/// Concatenate token texts back into source form.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
    for tok in tokens {
        out.push_str(&tok.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_render_reproduces_source() {
        let src = "(ns a.b\n  (:require [x.y :as y]))\r\n\n;; c\n(defn f [x] #\"re\\\"\" \\( @a #_b ^:m #:p{:k 1} \"s\n t\")\n";
        let toks = lex(src).unwrap();
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_reader_forms_are_classified() {
        use TokenKind::*;
        assert_eq!(
            kinds("#(f %) #{1} #?(:clj x) 'a"),
            vec![
                Open, Atom, Space, Atom, Close, Space, Open, Atom, Close, Space, Open, Atom,
                Space, Atom, Close, Space, Prefix, Atom
            ]
        );
    }

    #[test]
    fn test_char_literals_do_not_open_forms() {
        let toks = lex("[\\( \\) \\newline]").unwrap();
        assert_eq!(toks.iter().filter(|t| t.kind == TokenKind::Open).count(), 1);
        assert_eq!(toks[1].text, "\\(");
        assert_eq!(toks[5].text, "\\newline");
    }

    #[test]
    fn test_delimiters_inside_strings_and_comments_are_ignored() {
        assert!(lex("(a \"(\" ; )\n)").is_ok());
    }

    #[test]
    fn test_unbalanced_input_is_rejected_with_position() {
        assert_eq!(
            lex("(a\n  b))"),
            Err(ParseError::UnexpectedClose {
                found: ')',
                line: 2,
                col: 5
            })
        );
        assert_eq!(
            lex("(defn f [x)"),
            Err(ParseError::Mismatched {
                found: ')',
                open: "[".into(),
                line: 1,
                col: 11,
                open_line: 1,
                open_col: 9
            })
        );
        assert_eq!(
            lex("(a (b)"),
            Err(ParseError::Unclosed {
                open: "(".into(),
                line: 1,
                col: 1
            })
        );
        assert_eq!(
            lex("(a \"oops)"),
            Err(ParseError::UnterminatedString { line: 1, col: 4 })
        );
    }

    #[test]
    fn test_crlf_is_one_newline_token() {
        let toks = lex("a\r\nb").unwrap();
        assert_eq!(toks[1].kind, TokenKind::Newline);
        assert_eq!(toks[1].text, "\r\n");
        assert_eq!(toks[2].line, 2);
    }
}
