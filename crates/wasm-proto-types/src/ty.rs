//! Value types and memory-access descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// ValueType
// ══════════════════════════════════════════════════════════════════════════════

/// The four scalar types of the language. Closed; never extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(rename = "i32")]
    Int32,
    #[serde(rename = "i64")]
    Int64,
    #[serde(rename = "f32")]
    Float32,
    #[serde(rename = "f64")]
    Float64,
}

impl ValueType {
    pub fn is_int(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "i32"),
            Self::Int64 => write!(f, "i64"),
            Self::Float32 => write!(f, "f32"),
            Self::Float64 => write!(f, "f64"),
        }
    }
}

/// Render a result type list as `[i32 f64]`.
pub fn format_types(types: &[ValueType]) -> String {
    let parts: Vec<String> = types.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(" "))
}

// ══════════════════════════════════════════════════════════════════════════════
// Memory access
// ══════════════════════════════════════════════════════════════════════════════

/// Width and signedness of a single memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryType {
    Int8S,
    Int8U,
    Int16S,
    Int16U,
    Int32S,
    Int32U,
    Int64S,
    Int64U,
    Float32,
    Float64,
}

impl MemoryType {
    /// Access width in bytes.
    pub fn size(self) -> u32 {
        match self {
            Self::Int8S | Self::Int8U => 1,
            Self::Int16S | Self::Int16U => 2,
            Self::Int32S | Self::Int32U | Self::Float32 => 4,
            Self::Int64S | Self::Int64U | Self::Float64 => 8,
        }
    }

    /// The register type a load of this width produces and a store consumes.
    pub fn value_type(self) -> ValueType {
        match self {
            Self::Int8S | Self::Int8U | Self::Int16S | Self::Int16U | Self::Int32S | Self::Int32U => {
                ValueType::Int32
            }
            Self::Int64S | Self::Int64U => ValueType::Int64,
            Self::Float32 => ValueType::Float32,
            Self::Float64 => ValueType::Float64,
        }
    }

    /// Whether narrow loads sign-extend.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int8S | Self::Int16S | Self::Int32S | Self::Int64S
        )
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int8S => "s8",
            Self::Int8U => "u8",
            Self::Int16S => "s16",
            Self::Int16U => "u16",
            Self::Int32S => "s32",
            Self::Int32U => "u32",
            Self::Int64S => "s64",
            Self::Int64U => "u64",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
        };
        f.write_str(name)
    }
}

/// Addressing-distance hint. Carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Distance {
    #[default]
    Near,
    Far,
}

/// Alignment hint. Carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Aligned,
    Unaligned,
}

/// A memory-access descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemOp {
    pub distance: Distance,
    pub alignment: Alignment,
    pub mem_type: MemoryType,
}

impl MemOp {
    /// A near, aligned access of the given width.
    pub fn new(mem_type: MemoryType) -> Self {
        Self {
            distance: Distance::Near,
            alignment: Alignment::Aligned,
            mem_type,
        }
    }
}
