//! Script pipeline — rewrites one legacy GDScript source into modern syntax.
//!
//! Pure content-in/content-out; the tree walker owns all file I/O. Two
//! passes: the first detects file-scoped facts (editor-time API usage), the
//! second rewrites line by line.

use crate::core::rules::{flag_for_review, MigrationRules};
use crate::core::walker::FileMigration;

/// Migrate one script's content.
///
/// Line order is preserved, CRs in CRLF endings survive, and the `changed`
/// flag is a byte-for-byte comparison against the input.
pub fn migrate_script(content: &str, rules: &MigrationRules) -> FileMigration {
    // Pass one: a `tool` declaration may only be stripped if nothing in the
    // file references an editor-time API.
    let keep_tool = rules.references_editor_api(content);

    let mut review_markers = 0;
    let mut lines: Vec<String> = Vec::new();

    for raw in content.split('\n') {
        let (line, cr) = match raw.strip_suffix('\r') {
            Some(stripped) => (stripped, "\r"),
            None => (raw, ""),
        };

        if line.trim() == "tool" {
            if keep_tool {
                lines.push(format!("@tool{}", cr));
            }
            continue;
        }

        let outcome = rules.rewrite_line(line);
        if outcome.needs_review {
            review_markers += 1;
        }

        let (text, yield_flagged) = rewrite_yields(&outcome.text);
        if yield_flagged {
            review_markers += 1;
        }

        lines.push(format!("{}{}", text, cr));
    }

    let new_content = lines.join("\n");
    FileMigration {
        changed: new_content != content,
        content: new_content,
        review_markers,
    }
}

/// Rewrite `yield(object, "signal")` call sites on one line into
/// `await object.signal`.
///
/// The scanner is quote-aware and paren-depth-aware, so nested call
/// expressions in the first argument decompose correctly. A `yield(` call
/// that cannot be decomposed (wrong arity, computed signal name, arguments
/// continuing past the line) is left untouched and the line gains a
/// manual-review marker.
fn rewrite_yields(line: &str) -> (String, bool) {
    let mut out = String::with_capacity(line.len());
    let mut flagged = false;
    let mut in_string = false;
    let mut prev_word = false;

    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut idx = 0;

    while idx < chars.len() {
        let (pos, c) = chars[idx];

        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&(_, escaped)) = chars.get(idx + 1) {
                    out.push(escaped);
                    idx += 2;
                    continue;
                }
            } else if c == '"' {
                in_string = false;
            }
            idx += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            prev_word = false;
            idx += 1;
            continue;
        }

        if !prev_word && line[pos..].starts_with("yield") && is_call_site(line, pos + 5) {
            let open = pos + 5 + whitespace_len(&line[pos + 5..]);
            match parse_call_args(line, open) {
                Some((end, args)) => {
                    if let Some(awaited) = await_form(&args) {
                        out.push_str(&awaited);
                    } else {
                        flagged = true;
                        out.push_str(&line[pos..end]);
                    }
                    while idx < chars.len() && chars[idx].0 < end {
                        idx += 1;
                    }
                    prev_word = true;
                    continue;
                }
                None => {
                    // Arguments continue past this line; hands off.
                    flagged = true;
                    out.push_str(&line[pos..]);
                    idx = chars.len();
                    continue;
                }
            }
        }

        out.push(c);
        prev_word = c.is_alphanumeric() || c == '_';
        idx += 1;
    }

    if flagged {
        out = flag_for_review(&out, "yield");
    }
    (out, flagged)
}

/// True when the text at `after` (the end of the `yield` keyword) is a word
/// boundary followed, modulo whitespace, by an opening paren.
fn is_call_site(line: &str, after: usize) -> bool {
    let rest = &line[after..];
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => false,
        _ => rest.trim_start().starts_with('('),
    }
}

fn whitespace_len(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

/// Parse a balanced argument list starting at the opening paren at byte
/// index `open`. Returns the byte index just past the closing paren and the
/// top-level comma-separated arguments, or `None` if the list does not
/// close on this line.
fn parse_call_args(line: &str, open: usize) -> Option<(usize, Vec<String>)> {
    let mut depth: i32 = 1;
    let mut in_string = false;
    let mut escaped = false;
    let mut args = Vec::new();
    let mut current = String::new();

    for (off, c) in line[open + 1..].char_indices() {
        let abs = open + 1 + off;

        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let last = current.trim().to_string();
                    if !last.is_empty() || !args.is_empty() {
                        args.push(last);
                    }
                    return Some((abs + 1, args));
                }
                current.push(c);
            }
            ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 1 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    None
}

/// `(object, "signal")` → `await object.signal`, for exactly that shape.
fn await_form(args: &[String]) -> Option<String> {
    if args.len() != 2 {
        return None;
    }

    let object = args[0].trim();
    let signal = args[1].trim().strip_prefix('"')?.strip_suffix('"')?;

    let valid_signal = !signal.is_empty()
        && !signal.starts_with(|c: char| c.is_ascii_digit())
        && signal.chars().all(|c| c.is_alphanumeric() || c == '_');

    if object.is_empty() || !valid_signal {
        return None;
    }

    Some(format!("await {}.{}", object, signal))
}
