//! Rewriting of trigger actions. References to the OLD and NEW transition
//! rows become positional accessors into the row the trigger is fired
//! with, which carries only the columns the trigger needs.

use {
    crate::{
        descriptor::{ReferencedColumns, TableDescriptor},
        error::{ObjectKind, ObjectNotFoundSnafu, Result},
    },
    snafu::OptionExt,
};

/// One `correlation.column` reference in an action, located by byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionReference {
    pub correlation: String,
    pub column: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenAction {
    pub text: String,
    pub referenced_columns: ReferencedColumns,
    /// Table positions fetched when the trigger fires, ascending. Accessor
    /// `n` reads the `n`th of them.
    pub projection: Vec<u32>,
}

/// Finds the references to `old_name` or `new_name` in an action text.
/// Quoted strings and comments are skipped; unquoted identifiers and the
/// correlation names are compared in upper case.
pub fn find_transition_references(
    text: &str,
    old_name: Option<&str>,
    new_name: Option<&str>,
) -> Vec<TransitionReference> {
    let tokens = tokenize(text);
    let old_name = old_name.map(str::to_ascii_uppercase);
    let new_name = new_name.map(str::to_ascii_uppercase);
    let is_correlation =
        |name: &String| Some(name) == old_name.as_ref() || Some(name) == new_name.as_ref();

    let mut references = vec![];
    let mut i = 0;
    while i < tokens.len() {
        let qualified = i > 0 && tokens[i - 1].kind == TokenKind::Dot;
        if let (TokenKind::Ident(correlation), false) = (&tokens[i].kind, qualified) {
            if let (Some(dot), Some(column)) = (tokens.get(i + 1), tokens.get(i + 2)) {
                if let (TokenKind::Dot, TokenKind::Ident(column_name)) = (&dot.kind, &column.kind) {
                    if is_correlation(correlation) {
                        references.push(TransitionReference {
                            correlation: correlation.clone(),
                            column: column_name.clone(),
                            start: tokens[i].start,
                            end: column.end,
                        });
                        i += 3;
                        continue;
                    }
                }
            }
        }
        i += 1;
    }

    references
}

/// Rewrites `text` so every transition reference reads the fire-time row
/// positionally. `trigger_columns` are the `UPDATE OF` columns; when empty
/// the trigger fires with every column of the table.
pub fn rewrite_trigger_action(
    text: &str,
    references: &[TransitionReference],
    table: &TableDescriptor,
    old_name: Option<&str>,
    trigger_columns: &[u32],
) -> Result<RewrittenAction> {
    let mut action_columns = references
        .iter()
        .map(|r| {
            table
                .column(&r.column)
                .map(|c| c.position)
                .context(ObjectNotFoundSnafu {
                    kind: ObjectKind::Column,
                    name: format!("{}.{}", table.name, r.column),
                })
        })
        .collect::<Result<Vec<_>>>()?;
    action_columns.sort_unstable();
    action_columns.dedup();

    let mut trigger_columns = trigger_columns.to_vec();
    trigger_columns.sort_unstable();
    trigger_columns.dedup();

    let projection = if trigger_columns.is_empty() {
        let mut all = table.columns.iter().map(|c| c.position).collect::<Vec<_>>();
        all.sort_unstable();
        all
    } else {
        let mut projection = trigger_columns.clone();
        projection.extend(&action_columns);
        projection.sort_unstable();
        projection.dedup();
        projection
    };

    let old_name = old_name.map(str::to_ascii_uppercase);
    let mut sorted = references.to_vec();
    sorted.sort_by_key(|r| r.start);

    let mut rewritten = String::with_capacity(text.len());
    let mut copied = 0;
    for reference in &sorted {
        let Some(column) = table.column(&reference.column) else {
            continue;
        };
        // positions were validated above, so every column is projected
        let Some(n) = projection.iter().position(|&p| p == column.position) else {
            continue;
        };

        let accessor = if Some(&reference.correlation) == old_name.as_ref() {
            "TRIGGER_OLD_ROW"
        } else {
            "TRIGGER_NEW_ROW"
        };

        rewritten.push_str(&text[copied..reference.start]);
        rewritten.push_str(&format!(
            "CAST ({}({}) AS {})",
            accessor,
            n + 1,
            column.type_descriptor.data_type
        ));
        copied = reference.end;
    }
    rewritten.push_str(&text[copied..]);

    Ok(RewrittenAction {
        text: rewritten,
        referenced_columns: ReferencedColumns {
            trigger_columns,
            action_columns,
        },
        projection,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    Dot,
    Other,
}

#[derive(Debug)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

fn tokenize(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = vec![];
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let c = bytes[i];
        let kind = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'\'' => {
                i = skip_quoted(bytes, i, b'\'');
                TokenKind::Other
            }
            b'"' => {
                i = skip_quoted(bytes, i, b'"');
                let inner = &text[start + 1..i.saturating_sub(1).max(start + 1)];
                TokenKind::Ident(inner.replace("\"\"", "\""))
            }
            b'.' => {
                i += 1;
                TokenKind::Dot
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                TokenKind::Ident(text[start..i].to_ascii_uppercase())
            }
            _ => {
                // skip a whole multi-byte character
                i += text[i..].chars().next().map(char::len_utf8).unwrap_or(1);
                TokenKind::Other
            }
        };

        tokens.push(Token {
            kind,
            start,
            end: i,
        });
    }

    tokens
}

/// Returns the index just past the closing quote; doubled quotes escape.
fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}
