use std::fmt;

/// Machine-readable error codes for collaborators that branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidPayload,
    UnknownCourse,
    DanglingReference,
    SelfReference,
    CyclesDetected,
    InconsistentLevels,
    InvariantViolation,
}

impl ErrorCode {
    /// Every code, in table order.
    pub const ALL: [Self; 8] = [
        Self::ConfigParseError,
        Self::InvalidPayload,
        Self::UnknownCourse,
        Self::DanglingReference,
        Self::SelfReference,
        Self::CyclesDetected,
        Self::InconsistentLevels,
        Self::InvariantViolation,
    ];

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::InvalidPayload => "E1004",
            Self::UnknownCourse => "E2001",
            Self::DanglingReference => "E2002",
            Self::SelfReference => "E2003",
            Self::CyclesDetected => "E2004",
            Self::InconsistentLevels => "E2005",
            Self::InvariantViolation => "E9001",
        }
    }

    /// Stable kind name used in the failure report handed to the renderer.
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::ConfigParseError => "ConfigParseError",
            Self::InvalidPayload => "InvalidPayload",
            Self::UnknownCourse => "UnknownCourse",
            Self::DanglingReference => "DanglingReferenceError",
            Self::SelfReference => "SelfReferenceError",
            Self::CyclesDetected => "CyclesDetected",
            Self::InconsistentLevels => "InconsistentLevelsError",
            Self::InvariantViolation => "InvariantViolationError",
        }
    }

    /// Short summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidPayload => "Input payload could not be decoded",
            Self::UnknownCourse => "Course not found",
            Self::DanglingReference => "Relation references an unknown course",
            Self::SelfReference => "Relation links a course to itself",
            Self::CyclesDetected => "Prerequisite cycles detected",
            Self::InconsistentLevels => "Precomputed levels violate prerequisite order",
            Self::InvariantViolation => "Internal invariant violated",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .pensum/config.toml and retry."),
            Self::InvalidPayload => {
                Some("Expect target_course, courses and relations fields in the JSON payload.")
            }
            Self::UnknownCourse => Some("Check the course id against the catalog."),
            Self::DanglingReference | Self::SelfReference => None,
            Self::CyclesDetected => {
                Some("Remove one prerequisite in each listed cycle to make the curriculum valid.")
            }
            Self::InconsistentLevels => Some("Levels were recomputed from the prerequisite list."),
            Self::InvariantViolation => Some("Report a bug with the input payload attached."),
        }
    }

    /// Whether the pipeline recovers from this condition without failing.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        matches!(
            self,
            Self::DanglingReference | Self::SelfReference | Self::InconsistentLevels
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
