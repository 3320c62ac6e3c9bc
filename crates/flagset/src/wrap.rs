//! Word-wrapping with hanging indent, used by usage rendering.

/// Extra characters a line may run over the limit when that swallows the
/// rest of the text, so short trailing words are not orphaned.
const SLOP: usize = 5;

/// Word-wraps `text` to `width` columns with every line after the first
/// indented by `indent` spaces.
///
/// A `width` of 0 disables wrapping; embedded newlines are still indented.
/// When the target width leaves fewer than 24 usable columns the indent is
/// reduced to 16 so the text keeps a readable measure.
pub fn wrap(indent: usize, width: usize, text: &str) -> String {
    if width == 0 {
        return text.replace('\n', &format!("\n{}", " ".repeat(indent)));
    }

    let mut indent = indent;
    let mut out = String::new();
    if width.saturating_sub(indent) < 24 {
        indent = 16;
        out.push('\n');
        out.push_str(&" ".repeat(indent));
    }
    let measure = width.saturating_sub(indent);
    if measure < 24 {
        // Too narrow to wrap at all; keep the text on indented lines.
        let newline_indent = format!("\n{}", " ".repeat(indent));
        out.push_str(&text.replace('\n', &newline_indent));
        return out;
    }

    let limit = measure - SLOP;
    let newline_indent = format!("\n{}", " ".repeat(indent));
    let (first, mut rest) = wrap_chunk(limit, SLOP, text);
    out.push_str(&first.replace('\n', &newline_indent));
    while !rest.is_empty() {
        let (line, remainder) = wrap_chunk(limit, SLOP, rest);
        out.push_str(&newline_indent);
        out.push_str(&line.replace('\n', &newline_indent));
        rest = remainder;
    }

    out
}

/// Splits `text` on whitespace into an initial line of at most `limit`
/// characters and the remainder. Goes up to `slop` characters over the
/// limit when that takes in the entire text.
fn wrap_chunk(limit: usize, slop: usize, text: &str) -> (&str, &str) {
    if text.chars().count() <= limit + slop {
        return (text, "");
    }

    let mut cut = None;
    for (count, (idx, ch)) in text.char_indices().enumerate() {
        if count > limit {
            break;
        }
        if ch == ' ' || ch == '\t' || ch == '\n' {
            cut = Some(idx);
        }
    }
    match cut {
        Some(idx) => (&text[..idx], text[idx + 1..].trim_start()),
        // A single over-long word: emit it whole up to the next break.
        None => match text.find([' ', '\t', '\n']) {
            Some(idx) => (&text[..idx], text[idx + 1..].trim_start()),
            None => (text, ""),
        },
    }
}
