//! Usage-text rendering.
//!
//! Each visible flag contributes one row: a left column naming the flag and
//! its argument placeholder, padded to a shared width, and the usage
//! message word-wrapped with that width as hanging indent.

use crate::flag::Flag;
use crate::set::FlagSet;
use crate::wrap::wrap;

pub(crate) fn flag_usages(set: &FlagSet<'_>, width: usize) -> String {
    let mut rows: Vec<(String, String, String)> = Vec::new();
    for idx in set.formal_order() {
        let Some(flag) = set.flag_at(idx) else {
            continue;
        };
        if flag.hidden() {
            continue;
        }
        let (_, usage) = unquote_usage(flag);
        rows.push((left_column(flag), usage, trailers(flag)));
    }

    let left_width = rows
        .iter()
        .map(|(left, _, _)| left.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (left, usage, trailer) in rows {
        if usage.is_empty() && trailer.is_empty() {
            out.push_str(&left);
        } else {
            out.push_str(&format!("{left:<left_width$}"));
            out.push_str("  ");
            // The usage message wraps; default and deprecation trailers
            // are appended whole.
            out.push_str(&wrap(left_width + 2, width, &usage));
            out.push_str(&trailer);
        }
        out.push('\n');
    }
    out
}

/// `  -c, --name <placeholder>`, with the shorthand column blanked when
/// there is none (or it is deprecated) and the placeholder suffix derived
/// from the bare-presence default.
fn left_column(flag: &Flag<'_>) -> String {
    let mut left = match flag.shorthand() {
        Some(c) if flag.shorthand_deprecated().is_none() => {
            format!("  -{c}, --{}", flag.name())
        }
        _ => format!("      --{}", flag.name()),
    };

    let (placeholder, _) = unquote_usage(flag);
    match flag.no_opt_default() {
        // A value is required.
        None => left.push_str(&format!(" <{placeholder}>")),
        Some(no_opt) => {
            if flag.value_type() == "bool" && no_opt == "true" {
                // Bare presence means true; nothing to show.
            } else if plain_value_type(&flag.value_type()) {
                left.push_str(&format!(" [{placeholder}={no_opt}]"));
            } else {
                left.push_str(&format!(" [{placeholder}=\"{no_opt}\"]"));
            }
        }
    }
    left
}

/// Default and deprecation annotations, appended after the wrapped usage
/// message.
fn trailers(flag: &Flag<'_>) -> String {
    let mut out = String::new();
    if let Some(default) = flag.default() {
        if plain_value_type(&flag.value_type()) {
            out.push_str(&format!(" (default {default})"));
        } else {
            out.push_str(&format!(" (default \"{default}\")"));
        }
    }
    if let Some(message) = flag.shorthand_deprecated() {
        out.push_str(&format!(" (DEPRECATED shorthand: {message})"));
    }
    out
}

/// Extracts a back-quoted placeholder name from the usage string; falls
/// back to the codec's generic placeholder. Returns the placeholder and the
/// usage text with the quote markers removed.
fn unquote_usage(flag: &Flag<'_>) -> (String, String) {
    let usage = flag.usage();
    if let Some(start) = usage.find('`') {
        if let Some(len) = usage[start + 1..].find('`') {
            let name = &usage[start + 1..start + 1 + len];
            let mut stripped = String::with_capacity(usage.len());
            stripped.push_str(&usage[..start]);
            stripped.push_str(name);
            stripped.push_str(&usage[start + 1 + len + 1..]);
            return (name.to_string(), stripped);
        }
    }
    (flag.arg_name(), usage.to_string())
}

/// Types whose values render unquoted in placeholders and default trailers.
fn plain_value_type(type_name: &str) -> bool {
    type_name == "bool"
        || type_name == "char"
        || type_name.starts_with("int")
        || type_name.starts_with("uint")
        || type_name.starts_with("float")
}
