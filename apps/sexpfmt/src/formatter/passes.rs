//! Whitespace passes over a token stream. Each pass is independent and
//! gated by its own feature toggle.

use super::lexer::{Token, TokenKind};

/// Collapse runs of blank lines to a single blank line.
pub fn remove_consecutive_blank_lines(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut newlines = 0usize;
    for tok in tokens {
        match tok.kind {
            TokenKind::Newline => {
                newlines += 1;
                if newlines > 2 {
                    while out.last().is_some_and(|t| t.kind == TokenKind::Space) {
                        out.pop();
                    }
                    continue;
                }
                out.push(tok);
            }
            TokenKind::Space => out.push(tok),
            _ => {
                newlines = 0;
                out.push(tok);
            }
        }
    }
    out
}

/// Drop whitespace right after an opening delimiter and right before a
/// closing one. A line break that terminates a comment is kept.
pub fn remove_surrounding_whitespace(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if !tokens[i].kind.is_whitespace() {
            out.push(tokens[i].clone());
            i += 1;
            continue;
        }
        let mut j = i;
        while j < tokens.len() && tokens[j].kind.is_whitespace() {
            j += 1;
        }
        let next = tokens.get(j).map(|t| t.kind);
        let prev = out.last().map(|t| t.kind);
        if prev == Some(TokenKind::Open) && next != Some(TokenKind::Comment) {
            // leading whitespace inside a form
        } else if next == Some(TokenKind::Close) {
            if prev == Some(TokenKind::Comment) {
                if let Some(nl) = tokens[i..j].iter().find(|t| t.kind == TokenKind::Newline) {
                    out.push(nl.clone());
                }
            }
        } else {
            out.extend_from_slice(&tokens[i..j]);
        }
        i = j;
    }
    out
}

/// Separate adjacent forms with a single space, e.g. `(f(g))` -> `(f (g))`.
pub fn insert_missing_whitespace(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        if out.last().is_some_and(|prev| prev.kind.ends_form()) && tok.kind.starts_form() {
            out.push(Token::space(1));
        }
        out.push(tok);
    }
    out
}

/// Collapse interior runs of spaces to one. Leading indentation is left to
/// the indentation pass.
pub fn remove_multiple_non_indenting_spaces(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        let interior = out
            .last()
            .is_some_and(|prev| prev.kind != TokenKind::Newline);
        if tok.kind == TokenKind::Space && interior && tok.text != " " {
            out.push(Token::space(1));
        } else {
            out.push(tok);
        }
    }
    out
}

/// Strip spaces at the end of every line and of the file.
pub fn remove_trailing_whitespace(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        if tok.kind == TokenKind::Newline {
            while out.last().is_some_and(|t| t.kind == TokenKind::Space) {
                out.pop();
            }
        }
        out.push(tok);
    }
    while out.last().is_some_and(|t| t.kind == TokenKind::Space) {
        out.pop();
    }
    out
}
