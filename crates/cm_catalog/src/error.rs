use cm_world::UnitRecordError;
use std::path::PathBuf;

/// Error type for catalog and config reads.
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Ron(ron::Error),
    RonSpanned(ron::error::SpannedError),
    Record(UnitRecordError),
    /// A file the source requires does not exist.
    Missing(PathBuf),
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ron::Error> for CatalogError {
    fn from(err: ron::Error) -> Self {
        Self::Ron(err)
    }
}

impl From<ron::error::SpannedError> for CatalogError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonSpanned(err)
    }
}

impl From<UnitRecordError> for CatalogError {
    fn from(err: UnitRecordError) -> Self {
        Self::Record(err)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Ron(e) => write!(f, "RON serialization error: {}", e),
            Self::RonSpanned(e) => write!(f, "RON parse error: {}", e),
            Self::Record(e) => write!(f, "rejected unit record: {}", e),
            Self::Missing(path) => write!(f, "missing file: {}", path.display()),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Ron(e) => Some(e),
            Self::RonSpanned(e) => Some(e),
            Self::Record(e) => Some(e),
            Self::Missing(_) => None,
        }
    }
}
