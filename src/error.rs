//! Error types for the icon-bg-strip crate.

use std::path::PathBuf;

/// Errors that can occur while stripping backgrounds or loading job lists.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file does not exist or could not be opened.
    #[error("file not found: {}: {source}", path.display())]
    FileNotFound {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying open error.
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a decodable raster image.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// Path of the undecodable file.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// PNG encoding of the stripped image failed.
    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    /// The output file could not be created or written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Copying the original to its backup path failed.
    #[error("failed to back up to {}: {source}", path.display())]
    Backup {
        /// Backup destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file could not be read.
    #[error("failed to read manifest {}: {source}", path.display())]
    ManifestRead {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid TOML or does not match the expected layout.
    #[error("invalid manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let not_found = Error::FileNotFound {
            path: PathBuf::from("icons/mosque-icon.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = not_found.to_string();
        assert!(msg.contains("mosque-icon.png"));
        assert!(msg.contains("gone"));

        let write = Error::Write {
            path: PathBuf::from("/readonly/out.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(write.to_string().contains("/readonly/out.png"));
        assert!(write.to_string().contains("denied"));
    }

    #[test]
    fn manifest_parse_error_converts_from_toml() {
        let err: Error = toml::from_str::<toml::Value>("threshold = ")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::ManifestParse(_)));
        assert!(err.to_string().starts_with("invalid manifest"));
    }
}
