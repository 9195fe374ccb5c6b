//! Per-file compilation unit.

use crate::{
    Backend, FunctionDef, FunctionId, GlobalSymbol, Name, NodeArena, NodeId, Stage,
    StringInterner, StructDef, StructId, Table, TextureDef, TextureId, TypeTable, VariableDef,
    VariableId,
};
use rustc_hash::FxHashMap;

pub const MAX_BUFFER_SLOTS: u32 = 16;
pub const MAX_TEXTURE_SLOTS: u32 = 32;
pub const MAX_RENDER_TARGETS: u32 = 8;

/// Fixed-capacity slot bitset.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SlotSet {
    bits: u64,
    capacity: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SlotError {
    Claimed,
    OutOfRange,
    Exhausted,
}

impl SlotSet {
    pub const fn new(capacity: u32) -> Self {
        SlotSet { bits: 0, capacity }
    }

    pub const fn capacity(self) -> u32 {
        self.capacity
    }

    pub const fn contains(self, slot: u32) -> bool {
        slot < self.capacity && self.bits & (1 << slot) != 0
    }

    /// Claim `slot`; each slot may be claimed once.
    pub fn claim(&mut self, slot: u32) -> Result<u32, SlotError> {
        if slot >= self.capacity {
            return Err(SlotError::OutOfRange);
        }
        if self.contains(slot) {
            return Err(SlotError::Claimed);
        }
        self.bits |= 1 << slot;
        Ok(slot)
    }

    /// Claim the lowest free slot.
    pub fn claim_next(&mut self) -> Result<u32, SlotError> {
        let slot = (!self.bits).trailing_zeros();
        if slot >= self.capacity {
            return Err(SlotError::Exhausted);
        }
        self.claim(slot)
    }

    pub fn iter(self) -> impl Iterator<Item = u32> {
        (0..self.capacity).filter(move |&slot| self.contains(slot))
    }
}

/// Compilation progress of a shader. Transitions only move forward.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ShaderState {
    Unparsed,
    Parsed,
    Optimized(Stage),
    Generated(Stage, Backend),
    Packed,
}

impl ShaderState {
    pub fn can_advance_to(self, next: ShaderState) -> bool {
        use ShaderState::{Generated, Optimized, Packed, Parsed, Unparsed};
        match (self, next) {
            (Unparsed, Parsed) | (Parsed, Optimized(_) | Packed) => true,
            (Optimized(a), Optimized(b)) => b > a,
            (Optimized(a), Generated(b, _)) => a == b,
            (Generated(a, x), Generated(b, y)) => a == b && y > x,
            (Generated(a, _), Optimized(b)) => b > a,
            (Optimized(_) | Generated(..), Packed) => true,
            _ => false,
        }
    }
}

/// Text generated for one stage and backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageOutput {
    pub stage: Stage,
    pub backend: Backend,
    pub text: String,
    /// Byte offset in the packed blob; valid once the shader is packed.
    pub offset: u32,
    pub size: u32,
}

/// Everything known about one shader file.
#[derive(Clone, Debug)]
pub struct Shader {
    pub name: String,
    pub interner: StringInterner,
    pub arena: NodeArena,
    pub types: TypeTable,
    pub structs: Table<StructId, StructDef>,
    pub textures: Table<TextureId, TextureDef>,
    pub functions: Table<FunctionId, FunctionDef>,
    pub variables: Table<VariableId, VariableDef>,
    /// Top-level names and what they denote.
    pub globals: FxHashMap<Name, GlobalSymbol>,
    /// Top-level declaration nodes in source order.
    pub items: Vec<NodeId>,
    pub buffer_slots: SlotSet,
    pub texture_slots: SlotSet,
    pub target_slots: SlotSet,
    entries: [Option<FunctionId>; 3],
    outputs: Vec<StageOutput>,
    state: ShaderState,
}

impl Shader {
    pub fn new(name: impl Into<String>) -> Self {
        let mut interner = StringInterner::new();
        let types = TypeTable::new(&mut interner);
        Shader {
            name: name.into(),
            interner,
            arena: NodeArena::new(),
            types,
            structs: Table::new(),
            textures: Table::new(),
            functions: Table::new(),
            variables: Table::new(),
            globals: FxHashMap::default(),
            items: Vec::new(),
            buffer_slots: SlotSet::new(MAX_BUFFER_SLOTS),
            texture_slots: SlotSet::new(MAX_TEXTURE_SLOTS),
            target_slots: SlotSet::new(MAX_RENDER_TARGETS),
            entries: [None; 3],
            outputs: Vec::new(),
            state: ShaderState::Unparsed,
        }
    }

    pub fn state(&self) -> ShaderState {
        self.state
    }

    /// Move to `next`. Backward transitions are a driver bug.
    pub fn advance(&mut self, next: ShaderState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid shader transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
    }

    pub fn entry(&self, stage: Stage) -> Option<FunctionId> {
        self.entries[stage.index()]
    }

    /// Register `function` as the entry for `stage`, returning the
    /// previous entry when one already exists.
    pub fn set_entry(&mut self, stage: Stage, function: FunctionId) -> Result<(), FunctionId> {
        match self.entries[stage.index()] {
            Some(existing) => Err(existing),
            None => {
                self.entries[stage.index()] = Some(function);
                Ok(())
            }
        }
    }

    /// Stages that have an entry, in pipeline order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.entries[stage.index()].is_some())
    }

    pub fn name_of(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    pub fn push_output(&mut self, output: StageOutput) {
        self.outputs.push(output);
    }

    pub fn outputs(&self) -> &[StageOutput] {
        &self.outputs
    }

    /// Order outputs by backend then stage and assign blob offsets.
    pub fn pack(&mut self) {
        self.outputs
            .sort_by_key(|output| (output.backend, output.stage));
        let mut offset = 0u32;
        for output in &mut self.outputs {
            output.size = u32::try_from(output.text.len()).unwrap_or(u32::MAX);
            output.offset = offset;
            offset = offset.saturating_add(output.size);
        }
        self.advance(ShaderState::Packed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_claims() {
        let mut slots = SlotSet::new(4);
        assert_eq!(slots.claim(2), Ok(2));
        assert_eq!(slots.claim(2), Err(SlotError::Claimed));
        assert_eq!(slots.claim(4), Err(SlotError::OutOfRange));
        assert_eq!(slots.claim_next(), Ok(0));
        assert_eq!(slots.claim_next(), Ok(1));
        assert_eq!(slots.claim_next(), Ok(3));
        assert_eq!(slots.claim_next(), Err(SlotError::Exhausted));
        assert_eq!(slots.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_transitions_forward_only() {
        use ShaderState::*;
        assert!(Unparsed.can_advance_to(Parsed));
        assert!(Parsed.can_advance_to(Optimized(Stage::Vertex)));
        assert!(Optimized(Stage::Vertex).can_advance_to(Generated(Stage::Vertex, Backend::Hlsl)));
        assert!(Generated(Stage::Vertex, Backend::Hlsl)
            .can_advance_to(Generated(Stage::Vertex, Backend::Glsl)));
        assert!(Generated(Stage::Vertex, Backend::Metal).can_advance_to(Optimized(Stage::Fragment)));
        assert!(!Generated(Stage::Fragment, Backend::Hlsl).can_advance_to(Optimized(Stage::Vertex)));
        assert!(!Parsed.can_advance_to(Unparsed));
        assert!(!Packed.can_advance_to(Parsed));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut shader = Shader::new("test");
        let a = FunctionId::new(0);
        let b = FunctionId::new(1);
        assert_eq!(shader.set_entry(Stage::Fragment, a), Ok(()));
        assert_eq!(shader.set_entry(Stage::Fragment, b), Err(a));
        assert_eq!(shader.stages().collect::<Vec<_>>(), vec![Stage::Fragment]);
    }

    #[test]
    fn test_pack_orders_backend_then_stage() {
        let mut shader = Shader::new("test");
        shader.advance(ShaderState::Parsed);
        for (stage, backend, text) in [
            (Stage::Fragment, Backend::Glsl, "ccc"),
            (Stage::Vertex, Backend::Glsl, "bb"),
            (Stage::Vertex, Backend::Hlsl, "a"),
        ] {
            shader.push_output(StageOutput {
                stage,
                backend,
                text: text.into(),
                offset: 0,
                size: 0,
            });
        }
        shader.pack();
        let layout: Vec<_> = shader
            .outputs()
            .iter()
            .map(|o| (o.backend, o.stage, o.offset, o.size))
            .collect();
        assert_eq!(
            layout,
            vec![
                (Backend::Hlsl, Stage::Vertex, 0, 1),
                (Backend::Glsl, Stage::Vertex, 1, 2),
                (Backend::Glsl, Stage::Fragment, 3, 3),
            ]
        );
        assert_eq!(shader.state(), ShaderState::Packed);
    }
}
