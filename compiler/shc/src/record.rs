//! The packed per-file output record.

use serde::Serialize;
use shc_codegen::Reflection;
use shc_ir::{Backend, Shader, Stage};

/// Magic bytes opening a `.shbin` file.
pub const SHBIN_MAGIC: [u8; 4] = *b"SHCB";
pub const SHBIN_VERSION: u32 = 1;

/// Location of one stage's text for one backend inside the blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputEntry {
    pub stage: Stage,
    pub backend: Backend,
    pub offset: u32,
    pub size: u32,
}

/// Everything one shader file compiles to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShaderRecord {
    pub name: String,
    /// Generated texts concatenated in `outputs` order.
    #[serde(skip)]
    pub blob: Vec<u8>,
    /// Sorted by backend, then stage.
    pub outputs: Vec<OutputEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection: Option<Reflection>,
}

impl ShaderRecord {
    /// Collect the outputs of a packed shader.
    pub fn from_packed(shader: &Shader, reflection: Option<Reflection>) -> Self {
        let mut blob = Vec::new();
        let mut outputs = Vec::with_capacity(shader.outputs().len());
        for output in shader.outputs() {
            debug_assert_eq!(output.offset as usize, blob.len());
            blob.extend_from_slice(output.text.as_bytes());
            outputs.push(OutputEntry {
                stage: output.stage,
                backend: output.backend,
                offset: output.offset,
                size: output.size,
            });
        }
        ShaderRecord {
            name: shader.name.clone(),
            blob,
            outputs,
            reflection,
        }
    }

    /// Text generated for `stage` on `backend`.
    pub fn text(&self, stage: Stage, backend: Backend) -> Option<&str> {
        let entry = self
            .outputs
            .iter()
            .find(|entry| entry.stage == stage && entry.backend == backend)?;
        let start = entry.offset as usize;
        let bytes = self.blob.get(start..start + entry.size as usize)?;
        std::str::from_utf8(bytes).ok()
    }

    /// Binary form: magic, version, entry count, then one
    /// `(backend u8, stage u8, offset u32, size u32)` entry per output and
    /// the blob. Integers are little-endian.
    pub fn to_shbin(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(12 + self.outputs.len() * 10 + self.blob.len());
        bytes.extend_from_slice(&SHBIN_MAGIC);
        bytes.extend_from_slice(&SHBIN_VERSION.to_le_bytes());
        let count = u32::try_from(self.outputs.len()).unwrap_or(u32::MAX);
        bytes.extend_from_slice(&count.to_le_bytes());
        for entry in &self.outputs {
            bytes.push(entry.backend as u8);
            bytes.push(entry.stage as u8);
            bytes.extend_from_slice(&entry.offset.to_le_bytes());
            bytes.extend_from_slice(&entry.size.to_le_bytes());
        }
        bytes.extend_from_slice(&self.blob);
        bytes
    }

    /// Pretty JSON manifest: the output table and reflection.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
