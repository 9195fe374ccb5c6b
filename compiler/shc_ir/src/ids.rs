//! Dense id handles for symbol records.
//!
//! Every table hands out ids in registration order starting at 0, so an id
//! is a direct index into the table's record vector.

use std::fmt;

/// Conversion between an id handle and its table index.
pub trait DenseId: Copy + Eq {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl DenseId for $name {
            #[inline]
            fn from_index(index: usize) -> Self {
                $name(u32::try_from(index).unwrap_or(u32::MAX))
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Index into the struct table.
    StructId
);
define_id!(
    /// Index into the texture table.
    TextureId
);
define_id!(
    /// Index into the function table.
    FunctionId
);
define_id!(
    /// Index into the variable table. Locals, parameters, constants and
    /// buffers all share one table.
    VariableId
);
define_id!(
    /// Index into the type table.
    TypeId
);

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const INT: TypeId = TypeId(2);
    pub const UINT: TypeId = TypeId(3);
    pub const HALF: TypeId = TypeId(4);
    pub const FLOAT: TypeId = TypeId(5);
}
