use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidDescriptor(String),
    InvalidClassName(String),
    InvalidParameterIndex { method: String, index: u32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDescriptor(desc) => write!(f, "invalid descriptor: {desc}"),
            Error::InvalidClassName(name) => {
                write!(f, "class name must be in internal JVM format (a/b/C$D): {name}")
            }
            Error::InvalidParameterIndex { method, index } => {
                write!(f, "slot {index} is not a parameter of {method}")
            }
        }
    }
}

impl std::error::Error for Error {}
