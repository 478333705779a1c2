use thiserror::Error;

/// Failures reported by a [`crate::source::MediaSource`].
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Exiftool failed to execute or process the file")]
    Exiftool(#[from] exiftool::ExifToolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Media source unavailable: {0}")]
    Unavailable(String),
}

/// Failures reported by a [`crate::store::KeyValueStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not (de)serialize value for key {key}: {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock was poisoned")]
    Poisoned,
}

/// Failures reported by a [`crate::geocode::ReverseGeocode`] provider.
#[derive(Error, Debug, PartialEq)]
pub enum GeocodeError {
    #[error("Coordinates are not finite: ({0}, {1})")]
    InvalidCoordinates(f64, f64),

    #[error("Reverse geocoding failed: {0}")]
    Provider(String),
}

/// Errors from constructing the concrete adapters shipped with this crate.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Exiftool failed to start")]
    Exiftool(#[from] exiftool::ExifToolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not walk library folder")]
    Walk(#[from] walkdir::Error),
}
