//! Scene/resource pipeline — migrates serialized `.tscn`/`.tres` text.
//!
//! Two independent transformations: whole-word class renames (same shared
//! rename map as the script pipeline) and removal of stale `__meta__`
//! metadata blocks that have no meaning in the modern format.

use regex::Regex;

use crate::core::rules::MigrationRules;
use crate::core::walker::FileMigration;

/// Migrate one scene/resource file's content. Pure; no I/O.
pub fn migrate_resource(content: &str, rules: &MigrationRules) -> FileMigration {
    let renamed = rules.rename_classes(content);
    let stripped = strip_meta_blocks(&renamed);

    FileMigration {
        changed: stripped != content,
        content: stripped,
        review_markers: 0,
    }
}

/// Remove `__meta__ = { … }` property blocks.
///
/// The opening marker must be the exact `__meta__` key — a key that merely
/// shares the prefix (`__meta__extra`) is untouched. The block is consumed
/// to its matching close brace by depth counting with string awareness, not
/// to the last `}` in the file. A block that never closes is left alone
/// rather than truncating the file.
fn strip_meta_blocks(content: &str) -> String {
    // `\s*=` right after the key rejects longer keys like `__meta__extra`.
    let opener = Regex::new(r"(?m)^\s*__meta__\s*=\s*").unwrap();

    let mut text = content.to_string();
    let mut search_from = 0;

    loop {
        let (start, value_start) = match opener.find_at(&text, search_from) {
            Some(m) => (m.start(), m.end()),
            None => break,
        };

        let end = if text[value_start..].starts_with('{') {
            match matching_brace_end(&text, value_start) {
                Some(end) => end,
                None => {
                    // Unterminated block: skip past it, keep the file intact.
                    search_from = value_start;
                    continue;
                }
            }
        } else {
            // Scalar form (e.g. `__meta__ = null`): the line is the block.
            value_start + line_end(&text[value_start..])
        };

        // Swallow the trailing newline so no blank line is left behind.
        let end = end + newline_len(&text[end..]);
        text.replace_range(start..end, "");
        search_from = start;
    }

    text
}

/// Byte index just past the brace matching the one at `open`, counting
/// nested braces and skipping string literals.
fn matching_brace_end(text: &str, open: usize) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (off, c) in text[open..].char_indices() {
        if in_string {
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
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + off + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

fn line_end(s: &str) -> usize {
    s.find('\n').unwrap_or(s.len())
}

fn newline_len(s: &str) -> usize {
    if s.starts_with("\r\n") {
        2
    } else if s.starts_with('\n') {
        1
    } else {
        0
    }
}
