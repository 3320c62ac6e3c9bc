//! One flag definition: identity, metadata, and the value handle.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// A registered flag.
///
/// The entry owns its [`Value`] handle; the storage behind the handle
/// stays with the caller and must outlive the owning
/// [`FlagSet`](crate::FlagSet).
pub struct Flag<'a> {
    pub(crate) name: String,
    pub(crate) usage: String,
    pub(crate) shorthand: Option<char>,
    pub(crate) aliases: Vec<String>,
    pub(crate) value: Box<dyn Value + 'a>,
    pub(crate) default: Option<String>,
    pub(crate) no_opt_default: Option<String>,
    pub(crate) deprecated: Option<String>,
    pub(crate) shorthand_deprecated: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) visits: u32,
    pub(crate) annotations: IndexMap<String, Vec<String>>,
}

impl<'a> Flag<'a> {
    pub(crate) fn new(
        name: impl Into<String>,
        shorthand: Option<char>,
        usage: impl Into<String>,
        value: Box<dyn Value + 'a>,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        if let Some(c) = shorthand {
            if !c.is_alphabetic() {
                return Err(Error::InvalidShorthand(c));
            }
        }
        // Bare presence of a boolean flag means true.
        let no_opt_default = (value.type_name() == "bool").then(|| "true".to_string());
        Ok(Self {
            name,
            usage: usage.into(),
            shorthand,
            aliases: Vec::new(),
            value,
            default: None,
            no_opt_default,
            deprecated: None,
            shorthand_deprecated: None,
            hidden: false,
            visits: 0,
            annotations: IndexMap::new(),
        })
    }

    /// Canonical flag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help message as registered, back-quote markers included.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Single-letter form, if any.
    pub fn shorthand(&self) -> Option<char> {
        self.shorthand
    }

    /// Alternate names routing to this entry.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Display default recorded by `set_default`.
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Value substituted when the flag appears without an argument.
    pub fn no_opt_default(&self) -> Option<&str> {
        self.no_opt_default.as_deref()
    }

    /// Deprecation message for the whole flag.
    pub fn deprecated(&self) -> Option<&str> {
        self.deprecated.as_deref()
    }

    /// Deprecation message for the shorthand only.
    pub fn shorthand_deprecated(&self) -> Option<&str> {
        self.shorthand_deprecated.as_deref()
    }

    /// Whether the flag is excluded from usage text.
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Times this flag was set during the current parse.
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Whether the flag was set at least once.
    pub fn changed(&self) -> bool {
        self.visits > 0
    }

    /// Current value rendered as display text.
    pub fn value_text(&self) -> String {
        self.value.format()
    }

    /// Runtime type identity of the stored value.
    pub fn value_type(&self) -> String {
        self.value.type_name()
    }

    /// Generic usage placeholder for the stored value type.
    pub fn arg_name(&self) -> String {
        self.value.arg_name()
    }

    /// Annotation values under `key`, if any.
    pub fn annotation(&self, key: &str) -> Option<&[String]> {
        self.annotations.get(key).map(Vec::as_slice)
    }

    /// All annotations in insertion order.
    pub fn annotations(&self) -> &IndexMap<String, Vec<String>> {
        &self.annotations
    }

    pub(crate) fn is_bool(&self) -> bool {
        self.value.type_name() == "bool"
    }

    /// Display label naming the flag and its shorthand when present.
    pub(crate) fn label(&self) -> String {
        match self.shorthand {
            Some(c) => format!("-{c}, --{}", self.name),
            None => format!("--{}", self.name),
        }
    }
}

impl fmt::Debug for Flag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("shorthand", &self.shorthand)
            .field("aliases", &self.aliases)
            .field("value", &self.value.format())
            .field("type", &self.value.type_name())
            .field("visits", &self.visits)
            .field("hidden", &self.hidden)
            .finish()
    }
}

/// Flag names start alphabetic and continue alphanumeric, `-`, or `_`.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(Error::EmptyString);
    };
    if !first.is_alphabetic() {
        return Err(Error::InvalidFlagName(name.to_string()));
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return Err(Error::InvalidFlagName(name.to_string()));
    }
    Ok(())
}
