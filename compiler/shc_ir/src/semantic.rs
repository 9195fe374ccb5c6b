//! System-value semantics and vertex packing formats.

use crate::{ScalarKind, Stage};
use rustc_hash::FxHashMap;

/// Direction of a stage interface value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Direction {
    In,
    Out,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum SystemValue {
    Position,
    VertexId,
    InstanceId,
    FrontFacing,
    /// Render target `0..8`.
    Target(u8),
    Depth,
    DispatchThreadId,
    GroupId,
    GroupThreadId,
    GroupIndex,
}

const TARGET_NAMES: [&str; 8] = [
    "sv_target0",
    "sv_target1",
    "sv_target2",
    "sv_target3",
    "sv_target4",
    "sv_target5",
    "sv_target6",
    "sv_target7",
];

impl SystemValue {
    pub fn name(self) -> &'static str {
        match self {
            SystemValue::Position => "sv_position",
            SystemValue::VertexId => "sv_vertex_id",
            SystemValue::InstanceId => "sv_instance_id",
            SystemValue::FrontFacing => "sv_front_facing",
            SystemValue::Target(n) => TARGET_NAMES.get(n as usize).copied().unwrap_or("sv_target"),
            SystemValue::Depth => "sv_depth",
            SystemValue::DispatchThreadId => "sv_dispatch_thread_id",
            SystemValue::GroupId => "sv_group_id",
            SystemValue::GroupThreadId => "sv_group_thread_id",
            SystemValue::GroupIndex => "sv_group_index",
        }
    }

    /// Required scalar kind and component count.
    pub const fn expected(self) -> (ScalarKind, u8) {
        match self {
            SystemValue::Position | SystemValue::Target(_) => (ScalarKind::Float, 4),
            SystemValue::VertexId | SystemValue::InstanceId | SystemValue::GroupIndex => {
                (ScalarKind::UInt, 1)
            }
            SystemValue::FrontFacing => (ScalarKind::Bool, 1),
            SystemValue::Depth => (ScalarKind::Float, 1),
            SystemValue::DispatchThreadId | SystemValue::GroupId | SystemValue::GroupThreadId => {
                (ScalarKind::UInt, 3)
            }
        }
    }

    /// Whether the value may appear on `stage`'s interface in `direction`.
    pub const fn allowed(self, stage: Stage, direction: Direction) -> bool {
        match self {
            SystemValue::Position => matches!(
                (stage, direction),
                (Stage::Vertex, Direction::Out) | (Stage::Fragment, Direction::In)
            ),
            SystemValue::VertexId | SystemValue::InstanceId => {
                matches!((stage, direction), (Stage::Vertex, Direction::In))
            }
            SystemValue::FrontFacing => {
                matches!((stage, direction), (Stage::Fragment, Direction::In))
            }
            SystemValue::Target(_) | SystemValue::Depth => {
                matches!((stage, direction), (Stage::Fragment, Direction::Out))
            }
            SystemValue::DispatchThreadId
            | SystemValue::GroupId
            | SystemValue::GroupThreadId
            | SystemValue::GroupIndex => {
                matches!((stage, direction), (Stage::Compute, Direction::In))
            }
        }
    }

    pub const fn is_compute(self) -> bool {
        matches!(
            self,
            SystemValue::DispatchThreadId
                | SystemValue::GroupId
                | SystemValue::GroupThreadId
                | SystemValue::GroupIndex
        )
    }

    pub const fn is_fragment_output(self) -> bool {
        matches!(self, SystemValue::Target(_) | SystemValue::Depth)
    }
}

/// Name-to-semantic lookup, built the first time a semantic is parsed.
pub struct SemanticTable {
    map: FxHashMap<&'static str, SystemValue>,
}

impl SemanticTable {
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        let fixed = [
            SystemValue::Position,
            SystemValue::VertexId,
            SystemValue::InstanceId,
            SystemValue::FrontFacing,
            SystemValue::Depth,
            SystemValue::DispatchThreadId,
            SystemValue::GroupId,
            SystemValue::GroupThreadId,
            SystemValue::GroupIndex,
        ];
        for value in fixed {
            map.insert(value.name(), value);
        }
        for slot in 0..8u8 {
            let value = SystemValue::Target(slot);
            map.insert(value.name(), value);
        }
        SemanticTable { map }
    }

    pub fn lookup(&self, name: &str) -> Option<SystemValue> {
        self.map.get(name).copied()
    }
}

impl Default for SemanticTable {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory format of a vertex attribute.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackFormat {
    Float32,
    Float16,
    Unorm8,
    Snorm8,
    Unorm16,
    Snorm16,
    Uint8,
    Sint8,
    Uint16,
    Sint16,
    Uint32,
    Sint32,
}

impl PackFormat {
    pub fn from_name(name: &str) -> Option<PackFormat> {
        let format = match name {
            "float32" => PackFormat::Float32,
            "float16" => PackFormat::Float16,
            "unorm8" => PackFormat::Unorm8,
            "snorm8" => PackFormat::Snorm8,
            "unorm16" => PackFormat::Unorm16,
            "snorm16" => PackFormat::Snorm16,
            "uint8" => PackFormat::Uint8,
            "sint8" => PackFormat::Sint8,
            "uint16" => PackFormat::Uint16,
            "sint16" => PackFormat::Sint16,
            "uint32" => PackFormat::Uint32,
            "sint32" => PackFormat::Sint32,
            _ => return None,
        };
        Some(format)
    }

    /// Bytes per component.
    pub const fn component_size(self) -> u32 {
        match self {
            PackFormat::Float32 | PackFormat::Uint32 | PackFormat::Sint32 => 4,
            PackFormat::Float16
            | PackFormat::Unorm16
            | PackFormat::Snorm16
            | PackFormat::Uint16
            | PackFormat::Sint16 => 2,
            PackFormat::Unorm8 | PackFormat::Snorm8 | PackFormat::Uint8 | PackFormat::Sint8 => 1,
        }
    }

    /// Normalized and float formats feed float fields; integer formats
    /// feed integer fields of matching signedness.
    pub const fn accepts(self, scalar: ScalarKind) -> bool {
        match self {
            PackFormat::Float32
            | PackFormat::Float16
            | PackFormat::Unorm8
            | PackFormat::Snorm8
            | PackFormat::Unorm16
            | PackFormat::Snorm16 => scalar.is_float(),
            PackFormat::Uint8 | PackFormat::Uint16 | PackFormat::Uint32 => {
                matches!(scalar, ScalarKind::UInt)
            }
            PackFormat::Sint8 | PackFormat::Sint16 | PackFormat::Sint32 => {
                matches!(scalar, ScalarKind::Int)
            }
        }
    }

    /// Default format for an unannotated field.
    pub const fn natural(scalar: ScalarKind) -> PackFormat {
        match scalar {
            ScalarKind::Half => PackFormat::Float16,
            ScalarKind::Int => PackFormat::Sint32,
            ScalarKind::UInt | ScalarKind::Bool => PackFormat::Uint32,
            ScalarKind::Float => PackFormat::Float32,
        }
    }
}
