//! Build configuration.

use shc_ir::Backend;
use std::path::PathBuf;

/// Options for a build. The CLI fills this from its flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildConfig {
    /// Targets to generate, in output order.
    pub backends: Vec<Backend>,
    /// Directory receiving `<name>.shbin` and `<name>.reflect.json`.
    pub output_dir: PathBuf,
    /// Compile files concurrently, and backends concurrently within a stage.
    pub parallel: bool,
    /// Collect reflection and write the `.reflect.json` manifest.
    pub reflect: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            backends: Backend::ALL.to_vec(),
            output_dir: PathBuf::from("."),
            parallel: true,
            reflect: true,
        }
    }
}

impl BuildConfig {
    /// Backends deduplicated and sorted into output order.
    pub fn backends(&self) -> Vec<Backend> {
        let mut backends = self.backends.clone();
        backends.sort();
        backends.dedup();
        backends
    }
}
