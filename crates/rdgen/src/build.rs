//! Build script support.

use crate::{codegen::Codegen, grammar::Grammar};
use anyhow::Context as _;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// The extension of grammar files.
pub const EXTENSION: &str = "rdg";

pub fn process_root() -> anyhow::Result<()> {
    let build = Build::new()?;
    build.process()
}

pub fn process_dir(root_dir: &Path) -> anyhow::Result<()> {
    let build = Build::with_root_dir(root_dir.to_owned())?;
    build.process()
}

/// Generates a parser for each grammar file found under `root_dir`.
///
/// For `<root_dir>/foo/bar.rdg`, the following files are written:
///
/// * `$OUT_DIR/foo/bar.rs` - the generated parser
/// * `$OUT_DIR/foo/bar.expanded` - the grammar after left-recursion elimination
/// * `$OUT_DIR/foo/bar.plan` - the parse plan
#[derive(Debug)]
pub struct Build {
    root_dir: PathBuf,
    out_dir: PathBuf,
}

impl Build {
    pub fn new() -> anyhow::Result<Self> {
        let root_dir = env::var_os("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .context("The environment variable `CARGO_MANIFEST_DIR' is not set")?;
        Self::with_root_dir(root_dir)
    }

    pub fn with_root_dir(root_dir: PathBuf) -> anyhow::Result<Self> {
        let out_dir = env::var_os("OUT_DIR")
            .map(PathBuf::from)
            .context("The environment variable `OUT_DIR' is not set")?;
        Ok(Self::with_dirs(root_dir, out_dir))
    }

    pub fn with_dirs(root_dir: PathBuf, out_dir: PathBuf) -> Self {
        Self { root_dir, out_dir }
    }

    pub fn process(&self) -> anyhow::Result<()> {
        for entry in WalkDir::new(&self.root_dir) {
            let entry = entry.context("from WalkDir entry")?;
            if !entry.file_type().is_file() {
                continue;
            }
            let in_file = entry.path();
            match in_file.extension().and_then(|ext| ext.to_str()) {
                Some(EXTENSION) => self
                    .process_file(in_file)
                    .with_context(|| format!("failed to process {}", in_file.display()))?,
                _ => continue,
            }
        }

        Ok(())
    }

    fn process_file(&self, in_file: &Path) -> anyhow::Result<()> {
        let out_file = self.out_dir.join(in_file.strip_prefix(&self.root_dir)?);
        if let Some(out_dir) = out_file.parent() {
            fs::create_dir_all(out_dir)?;
        }

        println!("cargo:rerun-if-changed={}", in_file.display());

        let grammar = Grammar::from_file(in_file)?;
        let goal = grammar
            .first_nonterminal()
            .context("the grammar defines no rules")?;
        let compiled = crate::compile(&grammar, goal)?;
        let codegen = Codegen::new(&compiled.plan);

        fs::write(out_file.with_extension("rs"), codegen.to_string())?;
        fs::write(
            out_file.with_extension("expanded"),
            compiled.grammar.to_string(),
        )?;
        fs::write(out_file.with_extension("plan"), compiled.plan.to_string())?;

        Ok(())
    }
}
