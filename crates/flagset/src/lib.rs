//! POSIX/GNU-style command-line flag parsing over caller-owned storage.
//!
//! A [`FlagSet`] is a registry of typed flags. Each flag borrows a storage
//! location from the caller; parsing an argument list writes values straight
//! into those locations through a small text codec. Long flags (`--name`,
//! `--name=value`, `--name value`), shorthands (`-f`, `-f value`, `-f=value`,
//! `-fvalue`), joined clusters (`-abc`), and the `--` terminator all follow
//! the GNU conventions. Usage text is generated from the registered flags,
//! aligned and word-wrapped.
//!
//! ```
//! use flagset::FlagSet;
//!
//! let mut verbose = false;
//! let mut output = String::new();
//! let mut set = FlagSet::new("demo");
//! set.var_p(&mut verbose, "verbose", 'v', "enable verbose output").unwrap();
//! set.var_p(&mut output, "output", 'o', "write to `file`").unwrap();
//! set.parse(["-v", "-o", "out.txt", "input.txt"]).unwrap();
//! assert_eq!(set.args(), ["input.txt"]);
//! drop(set);
//! assert!(verbose);
//! assert_eq!(output, "out.txt");
//! ```
//!
//! The borrowed storage must outlive the set, so results are usually read
//! after the set is dropped (or through the typed accessors while it is
//! still alive). `--help` renders usage text and surfaces as the
//! [`Error::HelpRequested`] signal rather than a failure.

mod error;
mod flag;
mod set;
mod usage;
mod value;
pub mod wrap;

pub use error::{Error, Result};
pub use flag::Flag;
pub use set::FlagSet;
pub use value::{FlagValue, Value, ValueError, ValueRef};
