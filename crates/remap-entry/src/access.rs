use serde::{Deserialize, Serialize};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

/// Raw class file access flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    pub const fn new(flags: u16) -> Self {
        Self(flags)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, flag: u16) -> bool {
        self.0 & flag != 0
    }

    #[must_use]
    pub const fn with(self, flag: u16) -> Self {
        Self(self.0 | flag)
    }

    #[must_use]
    pub const fn without(self, flag: u16) -> Self {
        Self(self.0 & !flag)
    }

    pub const fn is_public(self) -> bool {
        self.contains(ACC_PUBLIC)
    }

    pub const fn is_private(self) -> bool {
        self.contains(ACC_PRIVATE)
    }

    pub const fn is_protected(self) -> bool {
        self.contains(ACC_PROTECTED)
    }

    pub const fn is_static(self) -> bool {
        self.contains(ACC_STATIC)
    }

    pub const fn is_final(self) -> bool {
        self.contains(ACC_FINAL)
    }

    pub const fn is_bridge(self) -> bool {
        self.contains(ACC_BRIDGE)
    }

    pub const fn is_varargs(self) -> bool {
        self.contains(ACC_VARARGS)
    }

    pub const fn is_interface(self) -> bool {
        self.contains(ACC_INTERFACE)
    }

    pub const fn is_abstract(self) -> bool {
        self.contains(ACC_ABSTRACT)
    }

    pub const fn is_synthetic(self) -> bool {
        self.contains(ACC_SYNTHETIC)
    }

    pub const fn is_annotation(self) -> bool {
        self.contains(ACC_ANNOTATION)
    }

    pub const fn is_enum(self) -> bool {
        self.contains(ACC_ENUM)
    }

    /// Package-private: none of public, protected or private.
    pub const fn is_package_private(self) -> bool {
        !self.contains(ACC_PUBLIC | ACC_PROTECTED | ACC_PRIVATE)
    }
}

impl From<u16> for AccessFlags {
    fn from(value: u16) -> Self {
        AccessFlags(value)
    }
}
