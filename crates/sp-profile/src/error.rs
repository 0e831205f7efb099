use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// The mask yielded fewer edge points than the configured floor.
    InsufficientPoints { found: usize, min_required: usize },
    /// Every sample was rejected as a spike; nothing is left to interpolate
    /// against.
    DegenerateProfile,
    /// The profile is too short for the requested polynomial degree.
    WindowTooShort { window: usize, degree: usize },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientPoints {
                found,
                min_required,
            } => {
                write!(f, "too few edge points: found {found}, need at least {min_required}")
            }
            Self::DegenerateProfile => write!(f, "every profile sample was rejected as a spike"),
            Self::WindowTooShort { window, degree } => {
                write!(
                    f,
                    "smoothing window {window} does not exceed polynomial degree {degree}"
                )
            }
        }
    }
}

impl std::error::Error for ProfileError {}
