//! # Layout Descriptions
//!
//! Every record and flag type in this crate can describe its own in-memory
//! shape and the native constants it mirrors. The runtime never consults
//! these descriptions; they exist so that a conformance check can compare
//! them against the kernel's reference definitions.
//!
//! ## Key Types
//!
//! - [`Shape`]: size, alignment, kind and ordered fields of a type
//! - [`Leaf`]: one scalar slot of a flattened [`Shape`]
//! - [`AbiShape`]: implemented by every type that crosses the kernel boundary
//! - [`NativeConstants`]: implemented by every flag set and enumeration

use core::mem::{align_of, size_of};

/// Broad category of a type, as far as layout comparison cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Two's complement integer
    Signed,
    /// Unsigned integer
    Unsigned,
    /// Composite with named fields
    Struct,
    /// Fixed-length sequence of one element type
    Array,
}

/// In-memory shape of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub size: usize,
    pub align: usize,
    pub kind: Kind,
    /// Fields in declaration order (array elements for [`Kind::Array`])
    pub fields: Vec<Field>,
}

/// A field of a composite [`Shape`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// Byte offset from the start of the enclosing type
    pub offset: usize,
    /// Explicit padding that only exists to match the native layout
    pub reserved: bool,
    pub shape: Shape,
}

/// One scalar slot of a flattened [`Shape`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    /// Byte offset from the start of the outermost type
    pub offset: usize,
    pub kind: Kind,
    pub bits: usize,
    pub reserved: bool,
}

impl Shape {
    /// Shape of a scalar integer type
    pub fn scalar<T>(kind: Kind) -> Self {
        Self {
            size: size_of::<T>(),
            align: align_of::<T>(),
            kind,
            fields: Vec::new(),
        }
    }

    /// Shape of a `#[repr(C)]` composite
    pub fn record<T>(fields: Vec<Field>) -> Self {
        Self {
            size: size_of::<T>(),
            align: align_of::<T>(),
            kind: Kind::Struct,
            fields,
        }
    }

    /// Width in bits
    pub fn bits(&self) -> usize {
        self.size * 8
    }

    /// Flattens nested composites into scalar slots, skipping zero-sized fields
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(0, false, &mut out);
        out
    }

    fn collect_leaves(&self, base: usize, reserved: bool, out: &mut Vec<Leaf>) {
        match self.kind {
            Kind::Signed | Kind::Unsigned => out.push(Leaf {
                offset: base,
                kind: self.kind,
                bits: self.bits(),
                reserved,
            }),
            Kind::Struct | Kind::Array => {
                for field in self.fields.iter().filter(|f| f.shape.size != 0) {
                    field
                        .shape
                        .collect_leaves(base + field.offset, reserved || field.reserved, out);
                }
            }
        }
    }
}

impl Field {
    /// Describes a field by projecting it out of its record
    ///
    /// The projection is never called; it only pins down the field's type.
    pub fn project<R, F: AbiShape>(
        name: &'static str,
        offset: usize,
        reserved: bool,
        _projection: fn(&R) -> &F,
    ) -> Self {
        Self {
            name,
            offset,
            reserved,
            shape: F::shape(),
        }
    }
}

/// A type whose layout must match a kernel definition
pub trait AbiShape {
    /// Describes the type's layout
    fn shape() -> Shape;
}

/// A record that mirrors a named native structure
pub trait NativeRecord: AbiShape {
    /// Name of the mirrored native structure, e.g. `struct stat`
    const NATIVE: &'static str;
}

macro_rules! scalar_shape {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl AbiShape for $ty {
                fn shape() -> Shape {
                    Shape::scalar::<$ty>(Kind::$kind)
                }
            }
        )*
    };
}

scalar_shape! {
    i8 => Signed,
    i16 => Signed,
    i32 => Signed,
    i64 => Signed,
    u8 => Unsigned,
    u16 => Unsigned,
    u32 => Unsigned,
    u64 => Unsigned,
}

impl<T: AbiShape, const N: usize> AbiShape for [T; N] {
    fn shape() -> Shape {
        let element = T::shape();
        let fields = (0..N)
            .map(|i| Field {
                name: "",
                offset: i * element.size,
                reserved: false,
                shape: element.clone(),
            })
            .collect();
        Shape {
            size: size_of::<[T; N]>(),
            align: align_of::<[T; N]>(),
            kind: Kind::Array,
            fields,
        }
    }
}

/// Describes one field of a record for [`AbiShape::shape`]
///
/// `field!(Record, name)` for a regular field, `field!(Record, reserved name)`
/// for padding that only exists to match the native layout.
#[macro_export]
macro_rules! field {
    ($record:ty, reserved $name:ident) => {
        $crate::layout::Field::project(
            stringify!($name),
            ::core::mem::offset_of!($record, $name),
            true,
            |r: &$record| &r.$name,
        )
    };
    ($record:ty, $name:ident) => {
        $crate::layout::Field::project(
            stringify!($name),
            ::core::mem::offset_of!($record, $name),
            false,
            |r: &$record| &r.$name,
        )
    };
}

/// A named constant together with the native macro it mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeConstant {
    /// Rust-side name
    pub name: &'static str,
    /// Native C macro, e.g. `O_CREAT`
    pub native: &'static str,
    pub value: i64,
}

impl NativeConstant {
    pub const fn new(name: &'static str, native: &'static str, value: i64) -> Self {
        Self {
            name,
            native,
            value,
        }
    }
}

/// A flag set or enumeration whose values mirror native constants
pub trait NativeConstants {
    /// One entry per named value
    const NATIVE: &'static [NativeConstant];

    /// Looks up the entry mirroring the given native macro
    fn native(native: &str) -> Option<&'static NativeConstant> {
        Self::NATIVE.iter().find(|c| c.native == native)
    }
}
