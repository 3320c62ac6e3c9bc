//! Flag registry and the argument-parsing state machine.

use std::collections::HashMap;
use std::cell::RefCell;
use std::io::Write;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Error, Result};
use crate::flag::{Flag, validate_name};
use crate::usage;
use crate::value::{FlagValue, Value, ValueRef};

/// A set of defined flags.
///
/// Flags are registered over caller-owned storage ([`var`](Self::var) /
/// [`var_p`](Self::var_p)), then [`parse`](Self::parse) dispatches an
/// argument list against the set, mutating that storage in place. The
/// borrowed storage must outlive the set.
pub struct FlagSet<'a> {
    name: String,
    formal: IndexMap<String, Flag<'a>>,
    shorthand_index: HashMap<char, usize>,
    alias_index: HashMap<String, usize>,
    actual: IndexSet<usize>,
    sorted_formal: RefCell<Vec<usize>>,
    sorted_actual: RefCell<Vec<usize>>,
    args: Vec<String>,
    args_before_terminator: Option<usize>,
    parsed: bool,
    sort_usage: bool,
    interspersed: bool,
    ignore_unknown: bool,
    exit_on_error: bool,
    shorthand_help: bool,
    output: Option<Box<dyn Write + 'a>>,
}

impl<'a> FlagSet<'a> {
    /// Creates an empty flag set with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formal: IndexMap::new(),
            shorthand_index: HashMap::new(),
            alias_index: HashMap::new(),
            actual: IndexSet::new(),
            sorted_formal: RefCell::new(Vec::new()),
            sorted_actual: RefCell::new(Vec::new()),
            args: Vec::new(),
            args_before_terminator: None,
            parsed: false,
            sort_usage: true,
            interspersed: true,
            ignore_unknown: false,
            exit_on_error: false,
            shorthand_help: true,
            output: None,
        }
    }

    /// Name this set was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of registered flags.
    pub fn len(&self) -> usize {
        self.formal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formal.is_empty()
    }

    /// Whether usage text lists flags in lexicographic order (default)
    /// instead of registration order.
    pub fn set_sort_usage(&mut self, sort: bool) {
        self.sort_usage = sort;
    }

    /// Whether positional tokens may appear between flags (default). When
    /// disabled, the first positional token stops flag scanning and it plus
    /// everything after it become positional arguments.
    pub fn set_interspersed(&mut self, interspersed: bool) {
        self.interspersed = interspersed;
    }

    /// Whether unregistered flags are silently skipped instead of failing.
    pub fn set_ignore_unknown(&mut self, ignore: bool) {
        self.ignore_unknown = ignore;
    }

    /// Whether input errors print their message and terminate the process
    /// (exit code 2; code 0 for the help signal) instead of returning.
    pub fn set_exit_on_error(&mut self, exit: bool) {
        self.exit_on_error = exit;
    }

    /// Whether an unregistered `-h` renders usage text (default).
    pub fn set_shorthand_help(&mut self, help: bool) {
        self.shorthand_help = help;
    }

    /// Redirects usage text and warnings away from stderr.
    pub fn set_output(&mut self, sink: impl Write + 'a) {
        self.output = Some(Box::new(sink));
    }

    /// Registers a flag over an explicit type-erased handle.
    ///
    /// Boolean-typed flags are given a bare-presence default of `"true"`.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        shorthand: Option<char>,
        usage: impl Into<String>,
        value: Box<dyn Value + 'a>,
    ) -> Result<()> {
        let flag = Flag::new(name, shorthand, usage, value)?;
        if self.taken(&flag.name) {
            return Err(Error::DuplicateName(flag.name.clone()));
        }
        if let Some(c) = flag.shorthand {
            if self.shorthand_index.contains_key(&c) {
                return Err(Error::DuplicateShorthand(c));
            }
        }
        let idx = self.formal.len();
        if let Some(c) = flag.shorthand {
            self.shorthand_index.insert(c, idx);
        }
        self.formal.insert(flag.name.clone(), flag);
        Ok(())
    }

    /// Registers a flag whose value lives in `dest`.
    pub fn var<T: FlagValue>(
        &mut self,
        dest: &'a mut T,
        name: impl Into<String>,
        usage: impl Into<String>,
    ) -> Result<()> {
        self.add(name, None, usage, Box::new(ValueRef::new(dest)))
    }

    /// Like [`var`](Self::var), with a shorthand letter usable after a
    /// single dash.
    pub fn var_p<T: FlagValue>(
        &mut self,
        dest: &'a mut T,
        name: impl Into<String>,
        shorthand: char,
        usage: impl Into<String>,
    ) -> Result<()> {
        self.add(name, Some(shorthand), usage, Box::new(ValueRef::new(dest)))
    }

    /// Looks up a flag by name or alias.
    pub fn lookup(&self, name: &str) -> Option<&Flag<'a>> {
        self.index_of(name)
            .and_then(|idx| self.formal.get_index(idx))
            .map(|(_, flag)| flag)
    }

    /// Parses `text` through the flag's codec immediately and records it as
    /// the display default.
    pub fn set_default(&mut self, name: &str, text: &str) -> Result<()> {
        let idx = self.require(name)?;
        let flag = &mut self.formal[idx];
        if let Err(err) = flag.value.parse(text) {
            return Err(Error::InvalidArgument {
                flag: flag.label(),
                value: text.to_string(),
                source: err,
            });
        }
        flag.default = Some(text.to_string());
        Ok(())
    }

    /// Records the value substituted when the flag appears bare. Not parsed
    /// until the flag is actually used that way.
    pub fn set_no_opt_default(&mut self, name: &str, text: &str) -> Result<()> {
        let idx = self.require(name)?;
        self.formal[idx].no_opt_default = Some(text.to_string());
        Ok(())
    }

    /// Adds an alternate name routing to the same flag.
    pub fn add_alias(&mut self, name: &str, alias: impl Into<String>) -> Result<()> {
        let alias = alias.into();
        validate_name(&alias)?;
        let idx = self.require(name)?;
        if self.taken(&alias) {
            return Err(Error::DuplicateName(alias));
        }
        self.alias_index.insert(alias.clone(), idx);
        self.formal[idx].aliases.push(alias);
        Ok(())
    }

    /// Marks the flag deprecated: hidden from usage text, with a warning
    /// written to the output sink whenever it is used.
    pub fn deprecate(&mut self, name: &str, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        if message.is_empty() {
            return Err(Error::EmptyString);
        }
        let idx = self.require(name)?;
        let flag = &mut self.formal[idx];
        flag.deprecated = Some(message);
        flag.hidden = true;
        Ok(())
    }

    /// Marks only the shorthand deprecated: the flag stays visible but the
    /// shorthand column is suppressed and its use warns.
    pub fn deprecate_shorthand(&mut self, shorthand: char, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        if message.is_empty() {
            return Err(Error::EmptyString);
        }
        let Some(&idx) = self.shorthand_index.get(&shorthand) else {
            return Err(Error::UnknownFlag(format!("-{shorthand}")));
        };
        self.formal[idx].shorthand_deprecated = Some(message);
        Ok(())
    }

    /// Excludes the flag from usage text.
    pub fn set_hidden(&mut self, name: &str) -> Result<()> {
        let idx = self.require(name)?;
        self.formal[idx].hidden = true;
        Ok(())
    }

    /// Appends values to the flag's annotation list under `key`, e.g.
    /// completion hints for an external generator.
    pub fn annotate<I, S>(&mut self, name: &str, key: impl Into<String>, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let idx = self.require(name)?;
        self.formal[idx]
            .annotations
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        Ok(())
    }

    /// Moves every flag of `other` into this set.
    ///
    /// With `ignore_duplicates`, entries whose name, shorthand, or alias is
    /// already taken are skipped; otherwise the first collision fails the
    /// whole merge and this set is left untouched.
    pub fn merge(&mut self, other: FlagSet<'a>, ignore_duplicates: bool) -> Result<()> {
        if !ignore_duplicates {
            for (name, flag) in &other.formal {
                if self.taken(name) {
                    return Err(Error::DuplicateName(name.clone()));
                }
                if let Some(c) = flag.shorthand {
                    if self.shorthand_index.contains_key(&c) {
                        return Err(Error::DuplicateShorthand(c));
                    }
                }
                for alias in &flag.aliases {
                    if self.taken(alias) {
                        return Err(Error::DuplicateName(alias.clone()));
                    }
                }
            }
        }
        for (name, flag) in other.formal {
            let collides = self.taken(&name)
                || flag
                    .shorthand
                    .is_some_and(|c| self.shorthand_index.contains_key(&c))
                || flag.aliases.iter().any(|alias| self.taken(alias));
            if collides {
                continue;
            }
            let idx = self.formal.len();
            if let Some(c) = flag.shorthand {
                self.shorthand_index.insert(c, idx);
            }
            for alias in &flag.aliases {
                self.alias_index.insert(alias.clone(), idx);
            }
            self.formal.insert(name, flag);
        }
        Ok(())
    }

    /// Current value of the named flag as display text.
    pub fn get_text(&self, name: &str) -> Result<String> {
        self.lookup(name)
            .map(|flag| flag.value.format())
            .ok_or_else(|| Error::UnknownFlag(format!("--{name}")))
    }

    /// Sets the named flag from text, through the same routine the parser
    /// uses: visit counting, bare-value substitution, and deprecation
    /// warnings all apply.
    pub fn set_text(&mut self, name: &str, value: &str) -> Result<()> {
        let idx = self.require(name)?;
        self.apply(idx, value, None)
    }

    /// Typed read of the named flag's current value.
    pub fn value_of<T: FlagValue>(&self, name: &str) -> Result<T> {
        let Some(flag) = self.lookup(name) else {
            return Err(Error::UnknownFlag(format!("--{name}")));
        };
        let stored = flag.value.type_name();
        let requested = T::type_name();
        if stored != requested {
            return Err(Error::TypeMismatch {
                flag: flag.label(),
                requested,
                stored,
            });
        }
        T::parse_text(&flag.value.format()).map_err(|err| Error::InvalidArgument {
            flag: flag.label(),
            value: flag.value.format(),
            source: err,
        })
    }

    /// Typed write of the named flag's value.
    pub fn set_value_of<T: FlagValue>(&mut self, name: &str, value: T) -> Result<()> {
        let idx = self.require(name)?;
        let flag = &self.formal[idx];
        let stored = flag.value.type_name();
        let requested = T::type_name();
        if stored != requested {
            return Err(Error::TypeMismatch {
                flag: flag.label(),
                requested,
                stored,
            });
        }
        let text = value.format();
        self.apply(idx, &text, None)
    }

    /// Times the named flag was set during the current parse; 0 when the
    /// flag is unknown or unused.
    pub fn visits(&self, name: &str) -> u32 {
        self.lookup(name).map(|flag| flag.visits).unwrap_or(0)
    }

    /// Whether the named flag was set at least once.
    pub fn changed(&self, name: &str) -> bool {
        self.visits(name) > 0
    }

    /// Non-flag tokens collected by the most recent parse.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Number of positional arguments collected before a literal `--`, or
    /// `None` when no terminator appeared.
    pub fn terminator_index(&self) -> Option<usize> {
        self.args_before_terminator
    }

    /// Whether [`parse`](Self::parse) has been called.
    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Registered flags in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag<'a>> {
        self.formal.values()
    }

    /// Calls `f` for every registered flag, in lexicographic order when
    /// usage sorting is enabled, registration order otherwise.
    pub fn visit_all<F: FnMut(&Flag<'a>)>(&self, mut f: F) {
        for idx in self.formal_order() {
            if let Some((_, flag)) = self.formal.get_index(idx) {
                f(flag);
            }
        }
    }

    /// Like [`visit_all`](Self::visit_all), but only for flags set during
    /// the most recent parse.
    pub fn visit<F: FnMut(&Flag<'a>)>(&self, mut f: F) {
        for idx in self.actual_order() {
            if let Some((_, flag)) = self.formal.get_index(idx) {
                f(flag);
            }
        }
    }

    /// Parses the given argument list, which must not include the program
    /// name. Repeated calls reset visit counts and re-derive the positional
    /// argument list.
    pub fn parse<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        let result = self.parse_tokens(tokens);
        if self.exit_on_error {
            match &result {
                Err(Error::HelpRequested) => std::process::exit(0),
                Err(err) => {
                    let message = err.to_string();
                    self.emit(&message);
                    std::process::exit(2);
                }
                Ok(()) => {}
            }
        }
        result
    }

    /// Parses the live process argument vector, excluding the program name.
    pub fn parse_args(&mut self) -> Result<()> {
        self.parse(std::env::args().skip(1))
    }

    /// Renders usage text for all visible flags, word-wrapped to `width`
    /// columns (0 disables wrapping).
    pub fn render_usage(&self, width: usize) -> String {
        usage::flag_usages(self, width)
    }

    /// Writes a `Usage of <name>:` header plus the rendered flag table to
    /// the configured output sink (stderr by default).
    pub fn print_usage(&mut self, width: usize) {
        let text = format!("Usage of {}:\n{}", self.name, self.render_usage(width));
        self.emit_block(&text);
    }

    fn parse_tokens(&mut self, tokens: Vec<String>) -> Result<()> {
        self.parsed = true;
        self.args.clear();
        self.args_before_terminator = None;
        self.actual.clear();
        self.sorted_actual.borrow_mut().clear();
        for flag in self.formal.values_mut() {
            flag.visits = 0;
        }
        tracing::debug!("parsing {} arguments for {}", tokens.len(), self.name);

        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_str();
            if token.len() <= 1 || !token.starts_with('-') {
                if !self.interspersed {
                    let rest = tokens[i..].iter().map(|t| unquote(t).to_string());
                    self.args.extend(rest);
                    break;
                }
                self.args.push(unquote(token).to_string());
                i += 1;
            } else if token == "--" {
                self.args_before_terminator = Some(self.args.len());
                let rest = tokens[i + 1..].iter().map(|t| unquote(t).to_string());
                self.args.extend(rest);
                break;
            } else if let Some(body) = token.strip_prefix("--") {
                i = self.parse_long(body, &tokens, i)?;
            } else {
                i = self.parse_short(&token[1..], &tokens, i)?;
            }
        }

        tracing::debug!(
            "parsed {} with {} positional arguments",
            self.name,
            self.args.len()
        );
        Ok(())
    }

    /// Handles one `--name[=value]` token; returns the index of the next
    /// unconsumed token.
    fn parse_long(&mut self, body: &str, tokens: &[String], i: usize) -> Result<usize> {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        if name.is_empty() || name.starts_with('-') || name.starts_with('=') {
            return Err(Error::CannotParse(format!("--{body}")));
        }

        let Some(idx) = self.index_of(name) else {
            if name == "help" {
                self.print_usage(0);
                return Err(Error::HelpRequested);
            }
            if self.ignore_unknown {
                // A detached value that does not itself look like a flag is
                // skipped along with the unknown flag.
                if inline.is_none() && i + 1 < tokens.len() && !looks_like_flag(&tokens[i + 1]) {
                    return Ok(i + 2);
                }
                return Ok(i + 1);
            }
            return Err(Error::UnknownFlag(format!("--{name}")));
        };

        let mut next = i + 1;
        let value = if let Some(value) = inline {
            value.to_string()
        } else if let Some(no_opt) = self.formal[idx].no_opt_default.clone() {
            no_opt
        } else if next < tokens.len() {
            let value = tokens[next].clone();
            next += 1;
            value
        } else {
            return Err(Error::MissingArgument(format!("--{name}")));
        };
        self.apply(idx, &value, None)?;
        Ok(next)
    }

    /// Handles one shorthand cluster (the token minus its leading dash);
    /// returns the index of the next unconsumed token.
    fn parse_short(&mut self, cluster: &str, tokens: &[String], i: usize) -> Result<usize> {
        let mut shorts = cluster;
        let mut next = i + 1;
        while let Some(c) = shorts.chars().next() {
            let rest = &shorts[c.len_utf8()..];
            let Some(&idx) = self.shorthand_index.get(&c) else {
                if c == 'h' && self.shorthand_help {
                    self.print_usage(0);
                    return Err(Error::HelpRequested);
                }
                if self.ignore_unknown {
                    if !rest.starts_with('=')
                        && next < tokens.len()
                        && !looks_like_flag(&tokens[next])
                    {
                        next += 1;
                    }
                    return Ok(next);
                }
                return Err(Error::UnknownFlag(format!("-{c}")));
            };

            let value;
            if let Some(attached) = rest.strip_prefix('=') {
                value = attached.to_string();
                shorts = "";
            } else if let Some(no_opt) = self.formal[idx].no_opt_default.clone() {
                value = no_opt;
                shorts = rest;
            } else if !rest.is_empty() {
                // Joined form: the rest of the cluster is the value.
                value = rest.to_string();
                shorts = "";
            } else if next < tokens.len() {
                value = tokens[next].clone();
                next += 1;
                shorts = "";
            } else {
                return Err(Error::MissingArgument(format!("-{c}")));
            }
            self.apply(idx, &value, Some(c))?;
        }
        Ok(next)
    }

    /// The shared set routine: substitution for bare values, codec parse,
    /// visit recording, and deprecation warnings.
    fn apply(&mut self, idx: usize, raw: &str, via_shorthand: Option<char>) -> Result<()> {
        let value = unquote(raw);
        let flag = &mut self.formal[idx];
        let text = if value.trim().is_empty() {
            match &flag.no_opt_default {
                Some(no_opt) => no_opt.clone(),
                None if flag.is_bool() => "true".to_string(),
                None => value.to_string(),
            }
        } else {
            value.to_string()
        };

        if let Err(err) = flag.value.parse(&text) {
            return Err(Error::InvalidArgument {
                flag: flag.label(),
                value: text,
                source: err,
            });
        }
        flag.visits += 1;
        let first_visit = flag.visits == 1;
        let name = flag.name.clone();
        let deprecated = flag.deprecated.clone();
        let shorthand_deprecated = via_shorthand.and(flag.shorthand_deprecated.clone());

        if first_visit {
            self.actual.insert(idx);
        }
        if let Some(message) = deprecated {
            tracing::warn!("deprecated flag --{name} used");
            self.emit(&format!("Flag --{name} has been deprecated, {message}"));
        }
        if let (Some(c), Some(message)) = (via_shorthand, shorthand_deprecated) {
            tracing::warn!("deprecated shorthand -{c} used");
            self.emit(&format!("Flag shorthand -{c} has been deprecated, {message}"));
        }
        Ok(())
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.formal
            .get_index_of(name)
            .or_else(|| self.alias_index.get(name).copied())
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| Error::UnknownFlag(format!("--{name}")))
    }

    fn taken(&self, name: &str) -> bool {
        self.formal.contains_key(name) || self.alias_index.contains_key(name)
    }

    pub(crate) fn formal_order(&self) -> Vec<usize> {
        if self.sort_usage {
            self.sorted_formal_indices()
        } else {
            (0..self.formal.len()).collect()
        }
    }

    fn actual_order(&self) -> Vec<usize> {
        if self.sort_usage {
            self.sorted_actual_indices()
        } else {
            self.actual.iter().copied().collect()
        }
    }

    /// Lexicographic view of all flags, recomputed when the flag count
    /// changed since the cache was built. Flags are never removed
    /// individually, so a length comparison is a sufficient staleness test.
    fn sorted_formal_indices(&self) -> Vec<usize> {
        let mut cache = self.sorted_formal.borrow_mut();
        if cache.len() != self.formal.len() {
            let mut indices: Vec<usize> = (0..self.formal.len()).collect();
            indices.sort_by(|&a, &b| self.name_at(a).cmp(self.name_at(b)));
            *cache = indices;
        }
        cache.clone()
    }

    fn sorted_actual_indices(&self) -> Vec<usize> {
        let mut cache = self.sorted_actual.borrow_mut();
        if cache.len() != self.actual.len() {
            let mut indices: Vec<usize> = self.actual.iter().copied().collect();
            indices.sort_by(|&a, &b| self.name_at(a).cmp(self.name_at(b)));
            *cache = indices;
        }
        cache.clone()
    }

    fn name_at(&self, idx: usize) -> &str {
        self.formal
            .get_index(idx)
            .map(|(name, _)| name.as_str())
            .unwrap_or("")
    }

    pub(crate) fn flag_at(&self, idx: usize) -> Option<&Flag<'a>> {
        self.formal.get_index(idx).map(|(_, flag)| flag)
    }

    fn emit(&mut self, message: &str) {
        match self.output.as_mut() {
            Some(sink) => {
                let _ = writeln!(sink, "{message}");
            }
            None => eprintln!("{message}"),
        }
    }

    fn emit_block(&mut self, text: &str) {
        match self.output.as_mut() {
            Some(sink) => {
                let _ = write!(sink, "{text}");
            }
            None => eprint!("{text}"),
        }
    }
}

fn looks_like_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

/// Strips one matching pair of surrounding quote characters, a convenience
/// for shell-like pass-through. Not a security boundary.
fn unquote(token: &str) -> &str {
    let bytes = token.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'\'' | b'"' | b'`') {
            return &token[1..token.len() - 1];
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_is_rejected() {
        let mut a = false;
        let mut b = false;
        let mut set = FlagSet::new("test");
        set.var(&mut a, "force", "").unwrap();
        let err = set.var(&mut b, "force", "").unwrap_err();
        assert!(matches!(err, Error::DuplicateName(name) if name == "force"));
    }

    #[test]
    fn duplicate_shorthand_is_rejected() {
        let mut a = false;
        let mut b = false;
        let mut set = FlagSet::new("test");
        set.var_p(&mut a, "force", 'f', "").unwrap();
        let err = set.var_p(&mut b, "fast", 'f', "").unwrap_err();
        assert!(matches!(err, Error::DuplicateShorthand('f')));
    }

    #[test]
    fn alias_may_not_collide_with_names_or_aliases() {
        let mut a = String::new();
        let mut b = String::new();
        let mut set = FlagSet::new("test");
        set.var(&mut a, "output", "").unwrap();
        set.var(&mut b, "input", "").unwrap();
        assert!(matches!(
            set.add_alias("output", "input"),
            Err(Error::DuplicateName(name)) if name == "input"
        ));
        set.add_alias("output", "path").unwrap();
        assert!(matches!(
            set.add_alias("input", "path"),
            Err(Error::DuplicateName(name)) if name == "path"
        ));
    }

    #[test]
    fn set_default_parses_immediately_and_seeds_storage() {
        let mut level = 0u32;
        let mut set = FlagSet::new("test");
        set.var(&mut level, "level", "").unwrap();
        set.set_default("level", "0x10").unwrap();
        assert_eq!(set.get_text("level").unwrap(), "16");
        let err = set.set_default("level", "nope").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn set_text_counts_visits_and_records_actual() {
        let mut out = String::new();
        let mut set = FlagSet::new("test");
        set.var(&mut out, "output", "").unwrap();
        assert!(!set.changed("output"));
        set.set_text("output", "a.txt").unwrap();
        set.set_text("output", "b.txt").unwrap();
        assert_eq!(set.visits("output"), 2);
        assert_eq!(set.get_text("output").unwrap(), "b.txt");
        let mut seen = Vec::new();
        set.visit(|flag| seen.push(flag.name().to_string()));
        assert_eq!(seen, ["output"]);
    }

    #[test]
    fn typed_accessors_check_type_names() {
        let mut port = 0u16;
        let mut set = FlagSet::new("test");
        set.var(&mut port, "port", "").unwrap();
        set.set_text("port", "8080").unwrap();
        assert_eq!(set.value_of::<u16>("port").unwrap(), 8080);
        let err = set.value_of::<String>("port").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        set.set_value_of::<u16>("port", 443).unwrap();
        assert_eq!(set.value_of::<u16>("port").unwrap(), 443);
        assert!(matches!(
            set.set_value_of::<i64>("port", 1),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn merge_moves_entries_and_their_indices() {
        let mut force = false;
        let mut out = String::new();
        let mut base = FlagSet::new("base");
        base.var_p(&mut force, "force", 'f', "").unwrap();
        let mut extra = FlagSet::new("extra");
        extra.var_p(&mut out, "output", 'o', "").unwrap();
        extra.add_alias("output", "path").unwrap();

        base.merge(extra, false).unwrap();
        base.parse(["-o", "x.txt"]).unwrap();
        assert_eq!(base.get_text("path").unwrap(), "x.txt");
    }

    #[test]
    fn merge_collision_fails_without_touching_target() {
        let mut a = false;
        let mut b = String::new();
        let mut c = false;
        let mut base = FlagSet::new("base");
        base.var_p(&mut a, "force", 'f', "").unwrap();
        let mut extra = FlagSet::new("extra");
        extra.var(&mut b, "output", "").unwrap();
        extra.var_p(&mut c, "fast", 'f', "").unwrap();

        let err = base.merge(extra, false).unwrap_err();
        assert!(matches!(err, Error::DuplicateShorthand('f')));
        // Nothing from the failed merge landed, not even the clean entry.
        assert!(base.lookup("output").is_none());
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn merge_with_ignore_duplicates_skips_collisions() {
        let mut a = false;
        let mut b = String::new();
        let mut c = false;
        let mut base = FlagSet::new("base");
        base.var_p(&mut a, "force", 'f', "").unwrap();
        let mut extra = FlagSet::new("extra");
        extra.var(&mut b, "output", "").unwrap();
        extra.var_p(&mut c, "fast", 'f', "").unwrap();

        base.merge(extra, true).unwrap();
        assert!(base.lookup("output").is_some());
        assert!(base.lookup("fast").is_none());
    }

    #[test]
    fn deprecation_warns_on_use() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut old = false;
            let mut set = FlagSet::new("test");
            set.var_p(&mut old, "legacy", 'l', "").unwrap();
            set.deprecate("legacy", "use --modern instead").unwrap();
            set.set_output(&mut buf);
            set.parse(["--legacy"]).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert!(
            text.contains("Flag --legacy has been deprecated, use --modern instead"),
            "unexpected warning output: {text:?}"
        );
    }

    #[test]
    fn shorthand_deprecation_warns_only_for_shorthand_use() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut v = false;
            let mut set = FlagSet::new("test");
            set.var_p(&mut v, "verbose", 'v', "").unwrap();
            set.deprecate_shorthand('v', "use --verbose").unwrap();
            set.set_output(&mut buf);
            set.parse(["--verbose"]).unwrap();
            set.parse(["-v"]).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches("has been deprecated").count(), 1);
        assert!(text.contains("Flag shorthand -v has been deprecated, use --verbose"));
    }

    #[test]
    fn deprecate_requires_a_message() {
        let mut v = false;
        let mut set = FlagSet::new("test");
        set.var(&mut v, "old", "").unwrap();
        assert!(matches!(set.deprecate("old", ""), Err(Error::EmptyString)));
    }

    #[test]
    fn unquote_strips_one_matching_pair() {
        assert_eq!(unquote("'hello'"), "hello");
        assert_eq!(unquote("\"a,b\""), "a,b");
        assert_eq!(unquote("`x`"), "x");
        assert_eq!(unquote("'mismatched\""), "'mismatched\"");
        assert_eq!(unquote("''"), "");
        assert_eq!(unquote("'"), "'");
        assert_eq!(unquote("plain"), "plain");
    }
}
