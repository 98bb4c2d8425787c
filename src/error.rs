//! Course configuration error types.

/// Errors that can occur when loading or validating a course description.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the course file from disk.
    #[error("failed to read course: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to parse JSON content.
    #[error("failed to parse course: {0}")]
    Parse(#[source] serde_json::Error),

    /// A start/end set references a checkpoint that does not exist.
    #[error("{owner} references unknown checkpoint {index}")]
    UnknownCheckpoint { owner: String, index: u32 },

    /// A tutorial gate links to a gate chain that does not exist.
    #[error("tutorial {tutorial} links to unknown gate chain {index}")]
    UnknownChain { tutorial: usize, index: usize },

    /// A min/max pair is inverted.
    #[error("{field}: min {min} is greater than max {max}")]
    InvalidRange { field: String, min: f32, max: f32 },

    /// A gate chain spacing is zero, negative or not finite.
    #[error("gate chain {chain}: spacing {spacing} must be positive and finite")]
    InvalidSpacing { chain: usize, spacing: f32 },

    /// A gate chain would pre-spawn more pairs than allowed.
    #[error("gate chain {chain} needs {needed} gate pairs, max is {max}")]
    TooManyGates { chain: usize, needed: f32, max: usize },
}
