use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch { expected: usize, actual: usize },
    OutOfBounds,
    InvalidStride,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "buffer size mismatch: expected {expected} elements, got {actual}")
            }
            Self::OutOfBounds => write!(f, "requested region is out of bounds"),
            Self::InvalidStride => write!(f, "stride is smaller than width"),
        }
    }
}

impl std::error::Error for Error {}
