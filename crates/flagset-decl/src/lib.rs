//! Declarative flag definitions.
//!
//! A [`FlagDecl`] list is a plain serde data model (kebab-case JSON) that
//! can be registered into a [`FlagSet`] in one call. Because a `FlagSet`
//! only borrows its value storage, the declarations are paired with a
//! [`DeclSet`] that owns one typed slot per declaration; the built set
//! borrows those slots for its lifetime.
//!
//! ```
//! use flagset_decl::{DeclSet, FlagDecl, FlagKind};
//!
//! let decls = vec![
//!     FlagDecl {
//!         name: "verbose".into(),
//!         shorthand: Some('v'),
//!         usage: "more output".into(),
//!         kind: FlagKind::Bool,
//!         ..Default::default()
//!     },
//! ];
//! let mut decl_set = DeclSet::new(decls);
//! let mut set = decl_set.build("demo").unwrap();
//! set.parse(["-v"]).unwrap();
//! drop(set);
//! assert_eq!(decl_set.value_text("verbose").as_deref(), Some("true"));
//! ```

use serde::{Deserialize, Serialize};

use flagset::{Error, FlagSet, FlagValue, ValueRef};

/// Storage shape for one declared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FlagKind {
    Bool,
    #[default]
    String,
    Int,
    Uint,
    Float,
    Char,
}

/// One declared flag.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct FlagDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shorthand: Option<char>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
    #[serde(default)]
    pub kind: FlagKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_opt_default: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

/// A named collection of flag declarations, the usual on-disk form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeclManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagDecl>,
}

#[derive(Debug, Clone)]
enum Slot {
    Bool(bool),
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
}

impl Slot {
    fn for_kind(kind: FlagKind) -> Self {
        match kind {
            FlagKind::Bool => Slot::Bool(false),
            FlagKind::String => Slot::Str(String::new()),
            FlagKind::Int => Slot::Int(0),
            FlagKind::Uint => Slot::Uint(0),
            FlagKind::Float => Slot::Float(0.0),
            FlagKind::Char => Slot::Char('\0'),
        }
    }

    fn format(&self) -> String {
        match self {
            Slot::Bool(v) => v.format(),
            Slot::Str(v) => v.format(),
            Slot::Int(v) => v.format(),
            Slot::Uint(v) => v.format(),
            Slot::Float(v) => v.format(),
            Slot::Char(v) => v.format(),
        }
    }
}

/// Declarations plus one owned storage slot per declaration.
#[derive(Debug, Clone)]
pub struct DeclSet {
    decls: Vec<FlagDecl>,
    slots: Vec<Slot>,
}

impl DeclSet {
    pub fn new(decls: Vec<FlagDecl>) -> Self {
        let slots = decls.iter().map(|decl| Slot::for_kind(decl.kind)).collect();
        Self { decls, slots }
    }

    pub fn from_manifest(manifest: DeclManifest) -> (String, Self) {
        (manifest.name, Self::new(manifest.flags))
    }

    pub fn decls(&self) -> &[FlagDecl] {
        &self.decls
    }

    /// Registers every declaration into a fresh [`FlagSet`] borrowing this
    /// set's slots. Registration failures (bad names, duplicate shorthands,
    /// unparseable defaults) propagate.
    pub fn build(&mut self, name: impl Into<String>) -> Result<FlagSet<'_>, Error> {
        let mut set = FlagSet::new(name);
        for (decl, slot) in self.decls.iter().zip(self.slots.iter_mut()) {
            match slot {
                Slot::Bool(dest) => register(&mut set, decl, dest)?,
                Slot::Str(dest) => register(&mut set, decl, dest)?,
                Slot::Int(dest) => register(&mut set, decl, dest)?,
                Slot::Uint(dest) => register(&mut set, decl, dest)?,
                Slot::Float(dest) => register(&mut set, decl, dest)?,
                Slot::Char(dest) => register(&mut set, decl, dest)?,
            }
        }
        Ok(set)
    }

    /// Display text of the slot backing `name`, after the built set has
    /// been dropped.
    pub fn value_text(&self, name: &str) -> Option<String> {
        self.decls
            .iter()
            .position(|decl| decl.name == name || decl.aliases.iter().any(|a| a == name))
            .and_then(|idx| self.slots.get(idx))
            .map(Slot::format)
    }
}

fn register<'a, T: FlagValue>(
    set: &mut FlagSet<'a>,
    decl: &FlagDecl,
    dest: &'a mut T,
) -> Result<(), Error> {
    set.add(
        decl.name.clone(),
        decl.shorthand,
        decl.usage.clone(),
        Box::new(ValueRef::new(dest)),
    )?;
    if let Some(default) = &decl.default {
        set.set_default(&decl.name, default)?;
    }
    if let Some(no_opt) = &decl.no_opt_default {
        set.set_no_opt_default(&decl.name, no_opt)?;
    }
    for alias in &decl.aliases {
        set.add_alias(&decl.name, alias.clone())?;
    }
    if decl.hidden {
        set.set_hidden(&decl.name)?;
    }
    if let Some(message) = &decl.deprecated {
        set.deprecate(&decl.name, message.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_encoding_is_kebab_case() {
        let decl = FlagDecl {
            name: "log-level".into(),
            usage: "sets the `level`".into(),
            no_opt_default: Some("warning".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&decl).unwrap();
        assert!(json.contains("\"no-opt-default\":\"warning\""), "{json}");
        let back: FlagDecl = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "log-level");
        assert_eq!(back.no_opt_default.as_deref(), Some("warning"));
        assert_eq!(back.kind, FlagKind::String);
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        assert!(serde_json::from_str::<FlagKind>("\"bool\"").is_ok());
        assert!(serde_json::from_str::<FlagKind>("\"weird\"").is_err());
    }

    #[test]
    fn build_registers_every_declaration() {
        let decls = vec![
            FlagDecl {
                name: "verbose".into(),
                shorthand: Some('v'),
                kind: FlagKind::Bool,
                ..Default::default()
            },
            FlagDecl {
                name: "jobs".into(),
                shorthand: Some('j'),
                kind: FlagKind::Uint,
                default: Some("4".into()),
                ..Default::default()
            },
            FlagDecl {
                name: "output".into(),
                aliases: vec!["path".into()],
                ..Default::default()
            },
        ];
        let mut decl_set = DeclSet::new(decls);
        let mut set = decl_set.build("demo").unwrap();
        set.parse(["-v", "--path", "x.txt"]).unwrap();
        assert_eq!(set.value_of::<u64>("jobs").unwrap(), 4);
        assert_eq!(set.get_text("output").unwrap(), "x.txt");
        drop(set);
        assert_eq!(decl_set.value_text("verbose").as_deref(), Some("true"));
        assert_eq!(decl_set.value_text("path").as_deref(), Some("x.txt"));
        assert_eq!(decl_set.value_text("jobs").as_deref(), Some("4"));
    }

    #[test]
    fn bad_defaults_fail_the_build() {
        let decls = vec![FlagDecl {
            name: "jobs".into(),
            kind: FlagKind::Uint,
            default: Some("many".into()),
            ..Default::default()
        }];
        let mut decl_set = DeclSet::new(decls);
        assert!(matches!(
            decl_set.build("demo"),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn deprecated_declarations_are_hidden() {
        let decls = vec![FlagDecl {
            name: "legacy".into(),
            kind: FlagKind::Bool,
            deprecated: Some("use --modern".into()),
            ..Default::default()
        }];
        let mut decl_set = DeclSet::new(decls);
        let set = decl_set.build("demo").unwrap();
        assert!(!set.render_usage(0).contains("--legacy"));
    }

    #[test]
    fn manifest_round_trips() {
        let manifest = DeclManifest {
            name: "demo".into(),
            flags: vec![FlagDecl {
                name: "verbose".into(),
                kind: FlagKind::Bool,
                ..Default::default()
            }],
        };
        let json = serde_json::to_string(&manifest).unwrap();
        let back: DeclManifest = serde_json::from_str(&json).unwrap();
        let (name, mut decl_set) = DeclSet::from_manifest(back);
        assert_eq!(name, "demo");
        assert!(decl_set.build(name.as_str()).is_ok());
    }
}
