//! Host-owned parameter buffer for replace-image plugins.
//!
//! The buffer is the concatenation, in declaration order, of each
//! declared variable's value at its natural width: `f32` -> 4 bytes,
//! `i32` -> 4 bytes, `bool` -> 1 byte. No padding, native byte order:
//! plugins are native modules loaded into the same process, so no
//! endianness conversion happens at this boundary.

use crate::plugin::abi::FloatRange;

/// Host-side variable type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// A 32-bit float.
    Float,
    /// A 32-bit signed integer.
    Int,
    /// A one-byte boolean.
    Bool,
}

impl VarKind {
    /// Encoded width of a value of this kind, in bytes.
    pub const fn width(self) -> usize {
        match self {
            VarKind::Float => 4,
            VarKind::Int => 4,
            VarKind::Bool => 1,
        }
    }
}

/// A typed variable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarValue {
    /// Float value.
    Float(f32),
    /// Integer value.
    Int(i32),
    /// Boolean value.
    Bool(bool),
}

impl VarValue {
    /// The kind this value belongs to.
    pub fn kind(self) -> VarKind {
        match self {
            VarValue::Float(_) => VarKind::Float,
            VarValue::Int(_) => VarKind::Int,
            VarValue::Bool(_) => VarKind::Bool,
        }
    }
}

/// Host-side mirror of one declared plugin variable.
///
/// Built once at load time from the plugin's static metadata; the tag
/// invariant (default matches kind) is enforced during that read.
#[derive(Debug, Clone)]
pub struct VarSpec {
    /// Variable name, shown in the editor.
    pub name: String,
    /// Short description, shown in the editor.
    pub description: String,
    /// Value type.
    pub kind: VarKind,
    /// Declared default value; its kind always matches `kind`.
    pub default: VarValue,
    /// Declared range, meaningful for numeric kinds.
    pub range: FloatRange,
}

/// Owned, exactly-sized byte buffer holding a replace-image plugin's
/// current parameter values.
///
/// Allocated zero-initialized at load time and lent to the plugin
/// callback as a raw pointer for the duration of each call.
#[derive(Debug)]
pub struct ParamBuffer {
    bytes: Vec<u8>,
    fields: Vec<Field>,
}

#[derive(Debug)]
struct Field {
    kind: VarKind,
    offset: usize,
}

impl ParamBuffer {
    /// Allocate a zero-initialized buffer sized for `specs`.
    pub fn from_specs(specs: &[VarSpec]) -> Self {
        let mut fields = Vec::with_capacity(specs.len());
        let mut offset = 0;
        for spec in specs {
            fields.push(Field {
                kind: spec.kind,
                offset,
            });
            offset += spec.kind.width();
        }
        Self {
            bytes: vec![0; offset],
            fields,
        }
    }

    /// Total encoded size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Number of declared variables.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Read the value of variable `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<VarValue> {
        let field = self.fields.get(index)?;
        let at = field.offset;
        let mut raw = [0u8; 4];
        Some(match field.kind {
            VarKind::Float => {
                raw.copy_from_slice(&self.bytes[at..at + 4]);
                VarValue::Float(f32::from_ne_bytes(raw))
            }
            VarKind::Int => {
                raw.copy_from_slice(&self.bytes[at..at + 4]);
                VarValue::Int(i32::from_ne_bytes(raw))
            }
            VarKind::Bool => VarValue::Bool(self.bytes[at] != 0),
        })
    }

    /// Write a value for variable `index`.
    ///
    /// Returns `false` (and leaves the buffer unchanged) if the index
    /// is out of range or the value's kind does not match the declared
    /// kind.
    pub fn set(&mut self, index: usize, value: VarValue) -> bool {
        let Some(field) = self.fields.get(index) else {
            return false;
        };
        if field.kind != value.kind() {
            tracing::warn!(index, "parameter kind mismatch, write ignored");
            return false;
        }
        let at = field.offset;
        match value {
            VarValue::Float(v) => self.bytes[at..at + 4].copy_from_slice(&v.to_ne_bytes()),
            VarValue::Int(v) => self.bytes[at..at + 4].copy_from_slice(&v.to_ne_bytes()),
            VarValue::Bool(v) => self.bytes[at] = v as u8,
        }
        true
    }

    /// Seed every variable with its declared default.
    pub fn apply_defaults(&mut self, specs: &[VarSpec]) {
        for (index, spec) in specs.iter().enumerate() {
            self.set(index, spec.default);
        }
    }

    /// Mutable pointer to the encoded bytes, for the plugin call
    /// boundary. The plugin may read and write through it for the
    /// duration of the call only.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr()
    }
}
