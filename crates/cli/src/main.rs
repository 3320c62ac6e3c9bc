use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use flagset::{Error, FlagSet};
use flagset_decl::{DeclManifest, DeclSet};

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct Report {
    set: String,
    flags: Vec<FlagReport>,
    args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    terminator_index: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct FlagReport {
    flag: String,
    value: String,
    visits: u32,
}

impl Report {
    fn from_set(set: &FlagSet<'_>) -> Self {
        let flags = set
            .iter()
            .map(|flag| FlagReport {
                flag: flag.name().to_string(),
                value: flag.value_text(),
                visits: flag.visits(),
            })
            .collect();
        Report {
            set: set.name().to_string(),
            flags,
            args: set.args().to_vec(),
            terminator_index: set.terminator_index(),
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    run(std::env::args().skip(1).collect())
}

fn run(argv: Vec<String>) -> Result<()> {
    let mut decls_path = String::from("flags.json");
    let mut show_usage = false;
    let mut width: usize = 0;

    let mut own = FlagSet::new("flagset");
    own.var_p(&mut decls_path, "decls", 'd', "read flag declarations from `file`")?;
    own.var_p(
        &mut show_usage,
        "usage",
        'u',
        "print the declared set's usage text instead of parsing",
    )?;
    own.var(&mut width, "wrap", "wrap usage output at `columns`")?;
    if !parse_or_help(&mut own, argv)? {
        return Ok(());
    }
    // Everything after `--` (or any plain positional) is the argument list
    // for the declared set.
    let target_argv = own.args().to_vec();
    drop(own);

    tracing::debug!("loading flag declarations from {decls_path}");
    let raw = fs::read(&decls_path).with_context(|| format!("failed to read {decls_path}"))?;
    let manifest: DeclManifest =
        serde_json::from_slice(&raw).context("failed to parse flag declarations JSON")?;
    let (name, mut decl_set) = DeclSet::from_manifest(manifest);

    let mut set = decl_set.build(name.as_str())?;
    if show_usage {
        print!("{}", set.render_usage(width));
        return Ok(());
    }
    if !parse_or_help(&mut set, target_argv)? {
        return Ok(());
    }

    let report = Report::from_set(&set);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Returns false when usage text was already rendered in response to
/// `--help`; real errors propagate.
fn parse_or_help(set: &mut FlagSet<'_>, args: Vec<String>) -> Result<bool> {
    match set.parse(args) {
        Ok(()) => Ok(true),
        Err(Error::HelpRequested) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
