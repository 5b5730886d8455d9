//! Flag definitions for the `dump`/`restore`/`schema`/`transform-field`
//! subcommands (§6 "CLI surface"). Kept deliberately thin: every flag here
//! maps onto a field the core crates already accept, no flag invents new
//! behavior of its own.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "slicedb", about = "Extract and restore referentially consistent database slices", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Walk the reference graph from one or more roots and write an archive.
    Dump(DumpArgs),
    /// Load an archive into the database named by the environment.
    Restore(RestoreArgs),
    /// Validate a schema document and print a short summary.
    Schema(SchemaArgs),
    /// Apply one transform class to a single value, for ad-hoc testing.
    TransformField(TransformFieldArgs),
}

#[derive(Args)]
pub struct DumpArgs {
    /// Path to the schema JSON document (§6 "Schema JSON").
    #[arg(long)]
    pub schema: PathBuf,

    /// Path to the transform JSON document (§6 "Transform JSON"); omit to
    /// dump every column verbatim.
    #[arg(long)]
    pub transform: Option<PathBuf>,

    /// Per-dump byte string mixed into transform seeds (§4.4 "Pepper"); a
    /// fresh random one is generated when omitted, which makes the mapping
    /// non-reproducible across runs.
    #[arg(long)]
    pub pepper: Option<String>,

    /// `<table> <condition>` traversal entry point; repeatable. Each
    /// occurrence contributes two raw tokens (table id, then predicate) to
    /// this flat list; [`DumpArgs::roots`] pairs them back up.
    #[arg(long, num_args = 2)]
    pub root: Vec<String>,

    /// Upper bound on concurrent sessions held by the snapshot pool.
    #[arg(long, default_value_t = 4)]
    pub jobs: usize,

    /// Also emit `pre-data`/`post-data` DDL sections via `pg_dump`.
    #[arg(long)]
    pub include_schema: bool,

    /// Run segment transforms in a forked child process where supported
    /// (§4.4.5); an optimisation, never required for correctness.
    #[arg(long)]
    pub fork_isolation: bool,

    /// Archive output path.
    #[arg(long)]
    pub output: PathBuf,
}

/// One `--root` occurrence: a table identifier and a trusted SQL predicate.
#[derive(Clone, Debug)]
pub struct RootArg {
    pub table: String,
    pub condition: String,
}

impl DumpArgs {
    /// Pairs up the flat `--root` token list into `(table, condition)`
    /// entries. `clap` guarantees the length is a multiple of 2 since every
    /// occurrence of `--root` consumes exactly `num_args = 2` tokens.
    pub fn roots(&self) -> Vec<RootArg> {
        self.root
            .chunks_exact(2)
            .map(|pair| RootArg {
                table: pair[0].clone(),
                condition: pair[1].clone(),
            })
            .collect()
    }
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Archive path to load.
    #[arg(long)]
    pub input: PathBuf,

    /// Upper bound on concurrent table loaders.
    #[arg(long, default_value_t = 4)]
    pub jobs: usize,

    /// Restore inside a single transaction, enabling deferrable
    /// constraints; forces `--jobs 1` regardless of the flag's value.
    #[arg(long)]
    pub transaction: bool,
}

#[derive(Args)]
pub struct SchemaArgs {
    /// Path to the schema JSON document to validate.
    #[arg(long)]
    pub schema: PathBuf,
}

#[derive(Args)]
pub struct TransformFieldArgs {
    /// Transformer class name (e.g. `GivenName`, `Compose`).
    #[arg(long)]
    pub class: String,

    /// Transformer config, as a JSON literal (e.g. `'["a","b"]'` for
    /// `Compose`).
    #[arg(long)]
    pub config: Option<String>,

    /// Pepper to seed the transformer with; defaults to a fresh random
    /// value, which is fine for a one-off check but not reproducible.
    #[arg(long)]
    pub pepper: Option<String>,

    /// Input value; `\N` is treated as SQL null.
    pub input: String,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    #[test]
    fn pairs_repeated_root_flags_in_order() {
        let cli = super::Cli::parse_from([
            "slicedb",
            "dump",
            "--schema",
            "schema.json",
            "--output",
            "out.zip",
            "--root",
            "public.parent",
            "id = 1",
            "--root",
            "public.other",
            "active",
        ]);
        let super::Command::Dump(args) = cli.command else {
            panic!("expected Dump subcommand");
        };
        let roots = args.roots();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].table, "public.parent");
        assert_eq!(roots[0].condition, "id = 1");
        assert_eq!(roots[1].table, "public.other");
        assert_eq!(roots[1].condition, "active");
    }
}
