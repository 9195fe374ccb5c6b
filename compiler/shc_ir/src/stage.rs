//! Pipeline stages and backend targets.

use bitflags::bitflags;
use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Vertex,
    Fragment,
    Compute,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Vertex, Stage::Fragment, Stage::Compute];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
        }
    }

    /// Entry symbol emitted for this stage.
    pub const fn entry_symbol(self) -> &'static str {
        match self {
            Stage::Vertex => "vs_main",
            Stage::Fragment => "fs_main",
            Stage::Compute => "cs_main",
        }
    }

    pub const fn mask(self) -> StageMask {
        match self {
            Stage::Vertex => StageMask::VERTEX,
            Stage::Fragment => StageMask::FRAGMENT,
            Stage::Compute => StageMask::COMPUTE,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of stages a resource is visible to.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct StageMask: u8 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const COMPUTE = 1 << 2;
    }
}

impl StageMask {
    /// Stage names in pipeline order, for reflection output.
    pub fn names(self) -> Vec<&'static str> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.contains(stage.mask()))
            .map(Stage::name)
            .collect()
    }
}

impl Serialize for StageMask {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

/// The closed set of output dialects.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Hlsl,
    Glsl,
    Metal,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Hlsl, Backend::Glsl, Backend::Metal];

    pub const fn name(self) -> &'static str {
        match self {
            Backend::Hlsl => "hlsl",
            Backend::Glsl => "glsl",
            Backend::Metal => "metal",
        }
    }

    /// Preprocessor define identifying the backend.
    pub const fn define(self) -> &'static str {
        match self {
            Backend::Hlsl => "SHC_HLSL",
            Backend::Glsl => "SHC_GLSL",
            Backend::Metal => "SHC_METAL",
        }
    }

    pub fn from_name(name: &str) -> Option<Backend> {
        match name {
            "hlsl" => Some(Backend::Hlsl),
            "glsl" => Some(Backend::Glsl),
            "metal" | "msl" => Some(Backend::Metal),
            _ => None,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_names_in_pipeline_order() {
        let mask = StageMask::COMPUTE | StageMask::VERTEX;
        assert_eq!(mask.names(), vec!["vertex", "compute"]);
    }

    #[test]
    fn test_backend_from_name() {
        assert_eq!(Backend::from_name("msl"), Some(Backend::Metal));
        assert_eq!(Backend::from_name("spirv"), None);
    }
}
