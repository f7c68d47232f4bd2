use shadowway_platformer::levels::LevelError;

#[derive(Debug)]
pub enum RunnerError {
    /// Invalid runner configuration.
    Config(String),
    /// An input script could not be read or parsed.
    Script(String),
    /// A custom level pack could not be loaded.
    Levels(LevelError),
    Io(std::io::Error),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(m) => write!(f, "invalid config: {m}"),
            Self::Script(m) => write!(f, "input script: {m}"),
            Self::Levels(e) => write!(f, "level pack: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Levels(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RunnerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<LevelError> for RunnerError {
    fn from(e: LevelError) -> Self {
        Self::Levels(e)
    }
}
