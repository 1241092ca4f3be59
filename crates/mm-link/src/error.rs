/// Errors from feeding a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The receive ring has no room for the byte
    Full,
    /// The link end was dropped
    Disconnected,
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkError::Full => write!(f, "Link receive buffer full"),
            LinkError::Disconnected => write!(f, "Link disconnected"),
        }
    }
}

impl std::error::Error for LinkError {}
