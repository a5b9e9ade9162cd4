//! Linker configuration
//!
//! Loaded from the `[linker]` table of a TOML file, or built in code.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rayon::ThreadPool;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LinkerConfig {
    /// Emit dynamically-imported files as their own entry points
    pub code_splitting: bool,
    /// Worker threads for the parallel clone phase. `None` uses rayon's
    /// global pool.
    pub threads: Option<usize>,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            code_splitting: true,
            threads: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    linker: LinkerConfig,
}

impl LinkerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("Failed to parse linker config")?;
        file.linker.validate()?;
        Ok(file.linker)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read linker config at {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid linker config at {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            anyhow::bail!("`threads` must be at least 1");
        }
        Ok(())
    }

    /// A dedicated thread pool when `threads` is set
    pub fn thread_pool(&self) -> Result<Option<ThreadPool>> {
        let Some(threads) = self.threads else {
            return Ok(None);
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("linker-{i}"))
            .build()
            .context("Failed to build linker thread pool")?;
        log::debug!("Using a dedicated pool of {threads} linker threads");
        Ok(Some(pool))
    }
}
