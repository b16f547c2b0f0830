use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entry::ClassEntry;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn descriptor_char(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }
}

/// A field type as it appears in a JVM descriptor.
///
/// Object types carry the internal class name (`java/lang/String`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeDescriptor {
    Base(BaseType),
    Object(String),
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn parse(desc: &str) -> Result<Self> {
        let (ty, rest) = parse_field_type(desc)?;
        if !rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        Ok(ty)
    }

    /// Number of local variable slots a value of this type occupies.
    pub fn size(&self) -> u32 {
        match self {
            TypeDescriptor::Base(BaseType::Long | BaseType::Double) => 2,
            _ => 1,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeDescriptor::Object(_))
    }

    /// The referenced class for plain object types. Arrays return `None`.
    pub fn class_entry(&self) -> Option<ClassEntry> {
        match self {
            TypeDescriptor::Object(name) => Some(ClassEntry::new(name.clone())),
            _ => None,
        }
    }

    /// Innermost element type of an array, or the type itself.
    pub fn element_type(&self) -> &TypeDescriptor {
        match self {
            TypeDescriptor::Array(component) => component.element_type(),
            other => other,
        }
    }

    pub fn map_classes(&self, f: &mut impl FnMut(&str) -> String) -> TypeDescriptor {
        match self {
            TypeDescriptor::Base(base) => TypeDescriptor::Base(*base),
            TypeDescriptor::Object(name) => TypeDescriptor::Object(f(name)),
            TypeDescriptor::Array(component) => {
                TypeDescriptor::Array(Box::new(component.map_classes(f)))
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Base(base) => write!(f, "{}", base.descriptor_char()),
            TypeDescriptor::Object(name) => write!(f, "L{name};"),
            TypeDescriptor::Array(component) => write!(f, "[{component}"),
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TypeDescriptor::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReturnType {
    Void,
    Type(TypeDescriptor),
}

impl ReturnType {
    pub fn as_type(&self) -> Option<&TypeDescriptor> {
        match self {
            ReturnType::Void => None,
            ReturnType::Type(ty) => Some(ty),
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("V"),
            ReturnType::Type(ty) => ty.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub params: Vec<TypeDescriptor>,
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    pub fn parse(desc: &str) -> Result<Self> {
        if !desc.starts_with('(') {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }

        let mut idx = 1usize;
        let mut params = Vec::new();
        let mut closed = false;
        while idx < desc.len() {
            if desc.as_bytes()[idx] == b')' {
                idx += 1;
                closed = true;
                break;
            }
            let (param, rest) = parse_field_type(&desc[idx..])?;
            idx = desc.len() - rest.len();
            params.push(param);
        }

        if !closed {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        let return_part = &desc[idx..];
        if return_part.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }

        let (return_type, rest) = if let Some(rest) = return_part.strip_prefix('V') {
            (ReturnType::Void, rest)
        } else {
            let (ty, rest) = parse_field_type(return_part)?;
            (ReturnType::Type(ty), rest)
        };

        if !rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }

        Ok(MethodDescriptor {
            params,
            return_type,
        })
    }

    /// Total number of local variable slots taken by the arguments.
    pub fn argument_slots(&self) -> u32 {
        self.params.iter().map(TypeDescriptor::size).sum()
    }

    pub fn map_classes(&self, mut f: impl FnMut(&str) -> String) -> MethodDescriptor {
        let params = self.params.iter().map(|p| p.map_classes(&mut f)).collect();
        let return_type = match &self.return_type {
            ReturnType::Void => ReturnType::Void,
            ReturnType::Type(ty) => ReturnType::Type(ty.map_classes(&mut f)),
        };
        MethodDescriptor {
            params,
            return_type,
        }
    }

    /// Every class type mentioned by the descriptor, including array element types.
    pub fn referenced_classes(&self) -> impl Iterator<Item = ClassEntry> + '_ {
        self.params
            .iter()
            .chain(self.return_type.as_type())
            .filter_map(|ty| ty.element_type().class_entry())
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            param.fmt(f)?;
        }
        f.write_str(")")?;
        self.return_type.fmt(f)
    }
}

impl FromStr for MethodDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MethodDescriptor::parse(s)
    }
}

fn parse_field_type(input: &str) -> Result<(TypeDescriptor, &str)> {
    let bytes = input.as_bytes();
    if bytes.is_empty() {
        return Err(Error::InvalidDescriptor(input.to_string()));
    }
    let base = |base| Ok((TypeDescriptor::Base(base), &input[1..]));
    match bytes[0] {
        b'B' => base(BaseType::Byte),
        b'C' => base(BaseType::Char),
        b'D' => base(BaseType::Double),
        b'F' => base(BaseType::Float),
        b'I' => base(BaseType::Int),
        b'J' => base(BaseType::Long),
        b'S' => base(BaseType::Short),
        b'Z' => base(BaseType::Boolean),
        b'L' => match input.find(';') {
            Some(end) if end > 1 => Ok((
                TypeDescriptor::Object(input[1..end].to_string()),
                &input[end + 1..],
            )),
            _ => Err(Error::InvalidDescriptor(input.to_string())),
        },
        b'[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((TypeDescriptor::Array(Box::new(component)), rest))
        }
        _ => Err(Error::InvalidDescriptor(input.to_string())),
    }
}
