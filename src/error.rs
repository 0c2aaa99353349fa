use std::fmt;

/// The crate-wide result alias, matching the teacher's `import::Result`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while reading, validating, transforming, or writing a
/// document.
#[derive(Debug)]
pub enum Error {
    /// Malformed GLB header, truncated chunk, invalid JSON, an unsupported
    /// glTF version, or a duplicate URI with conflicting bytes.
    Parse(String),

    /// A dangling reference, invalid enum value, out-of-range accessor
    /// component type, or an extension property attached to a disallowed
    /// parent type.
    Validation(String),

    /// A transform required an injected encoder that wasn't installed, or
    /// an extension declared a read-dependency the host didn't provide.
    DependencyMissing(String),

    /// The operation's semantics forbid it for the given property type
    /// (e.g. `copy` on a `Scene`, `Node`, `Root`, or `TextureInfo`).
    UnsupportedOperation(String),

    /// The platform I/O adapter failed to read or write an asset.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
            Error::Validation(msg) => write!(f, "validation error: {msg}"),
            Error::DependencyMissing(msg) => write!(f, "dependency missing: {msg}"),
            Error::UnsupportedOperation(msg) => write!(f, "unsupported operation: {msg}"),
            Error::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
