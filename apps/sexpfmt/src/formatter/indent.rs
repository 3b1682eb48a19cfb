//! Re-indentation of lines that begin inside a form.
//!
//! Columns are computed against the output as it is produced, so alignment
//! follows lines that were themselves re-indented earlier in the file. The
//! first line of the file, blank lines and lines inside multi-line strings
//! are never touched.

use super::lexer::{Token, TokenKind};
use super::rules::{IndentRule, IndentTable};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy)]
struct Child {
    /// Token index where the element begins (a prefix counts as the start).
    start: usize,
    first_in_line: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKind {
    List,
    Coll,
}

struct Frame<'a> {
    kind: FormKind,
    /// Output column of the opening delimiter.
    col: usize,
    width: usize,
    head: Option<&'a str>,
    children: &'a [Child],
    /// Output columns of the children emitted so far.
    child_cols: Vec<usize>,
    index_in_parent: usize,
}

impl Frame<'_> {
    fn coll_indent(&self) -> usize {
        self.col + self.width
    }

    fn inner_indent(&self) -> usize {
        self.col + self.width + 1
    }

    fn list_indent(&self, idx: usize) -> usize {
        if idx > 1 {
            if let Some(&c) = self.child_cols.get(1) {
                return c;
            }
        }
        self.coll_indent()
    }

    fn block_indent(&self, idx: usize, n: usize) -> usize {
        let body_on_own_line = self.children.get(n + 1).map_or(true, |c| c.first_in_line);
        if idx > n && body_on_own_line {
            self.inner_indent()
        } else {
            self.list_indent(idx)
        }
    }
}

fn prefix_arity(text: &str) -> usize {
    // metadata carries both the map and its target
    if text == "^" || text == "#^" {
        2
    } else {
        1
    }
}

/// Element starts of every form, keyed by the index of its opening token.
fn element_layout(tokens: &[Token]) -> HashMap<usize, Vec<Child>> {
    struct Open {
        index: usize,
        pending: usize,
    }
    let mut layout: HashMap<usize, Vec<Child>> = HashMap::new();
    let mut stack: Vec<Open> = Vec::new();
    let mut line_start = true;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::Newline => {
                line_start = true;
                continue;
            }
            TokenKind::Space => continue,
            _ => {}
        }
        let first_in_line = std::mem::replace(&mut line_start, false);
        if tok.kind == TokenKind::Close {
            stack.pop();
            continue;
        }
        if tok.kind.starts_form() {
            if let Some(open) = stack.last_mut() {
                if open.pending > 0 {
                    open.pending -= 1;
                } else {
                    layout.entry(open.index).or_default().push(Child {
                        start: i,
                        first_in_line,
                    });
                }
                if tok.kind == TokenKind::Prefix {
                    open.pending += prefix_arity(&tok.text);
                }
            }
        }
        if tok.kind == TokenKind::Open {
            layout.entry(i).or_default();
            stack.push(Open { index: i, pending: 0 });
        }
    }
    layout
}

struct Indenter<'a> {
    table: &'a IndentTable,
    aliases: &'a BTreeMap<String, String>,
}

impl Indenter<'_> {
    fn indent_for(&self, stack: &[Frame<'_>], token: usize) -> usize {
        let Some(frame) = stack.last() else {
            return 0;
        };
        let idx = frame.children.partition_point(|c| c.start < token);
        match frame.kind {
            FormKind::Coll => frame.coll_indent(),
            FormKind::List => self
                .rule_indent(stack, idx)
                .unwrap_or_else(|| frame.list_indent(idx)),
        }
    }

    /// First applicable rule, checking the enclosing list itself and then
    /// each ancestor for `inner` rules of matching depth.
    fn rule_indent(&self, stack: &[Frame<'_>], idx: usize) -> Option<usize> {
        let k = stack.len() - 1;
        for depth in 0..=k {
            let owner = &stack[k - depth];
            if owner.kind != FormKind::List {
                continue;
            }
            let Some(head) = owner.head else {
                continue;
            };
            for rule in self.table.lookup(head, self.aliases) {
                match *rule {
                    IndentRule::Block(n) if depth == 0 => {
                        return Some(stack[k].block_indent(idx, n));
                    }
                    IndentRule::Inner { depth: d, index } if d == depth => {
                        let position = if depth == 0 {
                            idx
                        } else {
                            stack[k - depth + 1].index_in_parent
                        };
                        if index.map_or(true, |want| position == want + 1) {
                            return Some(stack[k].inner_indent());
                        }
                    }
                    _ => {}
                }
            }
        }
        None
    }
}

/// Replace the leading whitespace of every line that starts inside a form.
pub fn reindent(
    tokens: &[Token],
    table: &IndentTable,
    aliases: &BTreeMap<String, String>,
) -> Vec<Token> {
    let layout = element_layout(tokens);
    let indenter = Indenter { table, aliases };
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut col = 0usize;
    let mut at_line_start = false;
    let mut pending_space: Option<Token> = None;

    for (i, tok) in tokens.iter().enumerate() {
        if at_line_start {
            match tok.kind {
                TokenKind::Space => {
                    pending_space = Some(tok.clone());
                    continue;
                }
                TokenKind::Newline => {
                    // blank line: leave it as found
                    out.extend(pending_space.take());
                }
                _ => {
                    pending_space = None;
                    let indent = indenter.indent_for(&stack, i);
                    if indent > 0 {
                        out.push(Token::space(indent));
                    }
                    col = indent;
                }
            }
            at_line_start = false;
        }

        if tok.kind.starts_form() {
            if let Some(frame) = stack.last_mut() {
                let expected = frame.children.get(frame.child_cols.len());
                if expected.is_some_and(|c| c.start == i) {
                    frame.child_cols.push(col);
                }
            }
        }

        let start_col = col;
        col = match tok.trailing_width() {
            Some(w) => w,
            None => col + tok.width(),
        };

        match tok.kind {
            TokenKind::Open => {
                let children = layout.get(&i).map(Vec::as_slice).unwrap_or(&[]);
                let head = children
                    .first()
                    .map(|c| &tokens[c.start])
                    .filter(|t| t.kind == TokenKind::Atom)
                    .map(|t| t.text.as_str());
                let index_in_parent = stack.last().map_or(0, |parent| {
                    parent
                        .children
                        .partition_point(|c| c.start <= i)
                        .saturating_sub(1)
                });
                let kind = if tok.text.ends_with('(') {
                    FormKind::List
                } else {
                    FormKind::Coll
                };
                stack.push(Frame {
                    kind,
                    col: start_col,
                    width: tok.width(),
                    head,
                    children,
                    child_cols: Vec::new(),
                    index_in_parent,
                });
            }
            TokenKind::Close => {
                stack.pop();
            }
            TokenKind::Newline => {
                at_line_start = true;
                col = 0;
            }
            _ => {}
        }
        out.push(tok.clone());
    }
    out.extend(pending_space);
    out
}
