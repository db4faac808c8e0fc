//! Decode and encode adapters.
//!
//! Backends only move pixels between files and memory. Classification lives
//! in [`crate::classify`] and is identical whichever backend is selected.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngDecoder, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError, ImageReader, RgbaImage};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Image I/O backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Backend {
    /// Any container the `image` crate can decode, detected from file content.
    #[default]
    Auto,
    /// PNG only. Other containers fail to decode.
    Png,
}

impl Backend {
    /// Load the image at `path` into memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the file cannot be opened and
    /// [`Error::Decode`] if its contents are not a decodable image.
    pub fn load(self, path: &Path) -> Result<DynamicImage> {
        let decode_err = |source: ImageError| Error::Decode {
            path: path.to_path_buf(),
            source,
        };

        match self {
            Self::Auto => {
                let reader = ImageReader::open(path).map_err(|source| Error::FileNotFound {
                    path: path.to_path_buf(),
                    source,
                })?;
                reader
                    .with_guessed_format()
                    .map_err(|e| decode_err(ImageError::IoError(e)))?
                    .decode()
                    .map_err(decode_err)
            }
            Self::Png => {
                let file = File::open(path).map_err(|source| Error::FileNotFound {
                    path: path.to_path_buf(),
                    source,
                })?;
                let decoder = PngDecoder::new(BufReader::new(file)).map_err(decode_err)?;
                DynamicImage::from_decoder(decoder).map_err(decode_err)
            }
        }
    }

    /// Encode an RGBA image as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the encoder rejects the buffer.
    pub fn encode(self, image: &RgbaImage) -> Result<Vec<u8>> {
        let compression = match self {
            Self::Auto => CompressionType::Default,
            Self::Png => CompressionType::Best,
        };

        let mut buf = Vec::new();
        PngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(Error::Encode)?;
        Ok(buf)
    }
}

/// Write encoded bytes to `path`, replacing any existing file.
///
/// The bytes go to a temporary file next to `path` which is then renamed over
/// it, so an interrupted write never leaves a truncated target behind.
/// Missing parent directories are not created.
///
/// # Errors
///
/// Returns [`Error::Write`] on any I/O failure.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 0]));
        img.put_pixel(1, 1, Rgba([12, 34, 56, 200]));
        img
    }

    #[test]
    fn both_backends_encode_lossless_png() {
        let img = sample();
        for backend in [Backend::Auto, Backend::Png] {
            let bytes = backend.encode(&img).unwrap();
            assert!(bytes.starts_with(b"\x89PNG"));
            let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
            assert_eq!(decoded, img);
        }
    }

    #[test]
    fn default_backend_is_auto() {
        assert_eq!(Backend::default(), Backend::Auto);
    }

    #[cfg(unix)]
    #[test]
    fn write_output_replaces_instead_of_truncating() {
        use std::io::Read;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("icon.png");
        std::fs::write(&path, b"original bytes").unwrap();
        let mut old_handle = File::open(&path).unwrap();

        write_output(&path, b"new").unwrap();

        // The old inode is untouched; only the directory entry moved.
        let mut old = Vec::new();
        old_handle.read_to_end(&mut old).unwrap();
        assert_eq!(old, b"original bytes");
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn write_output_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("icon.png");
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_output(&path, b"new").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn failed_write_leaves_target_and_no_stray_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("icon.png");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();

        let err = write_output(&target, b"png").unwrap_err();

        assert!(matches!(err, Error::Write { .. }), "{err}");
        assert_eq!(std::fs::read(target.join("keep")).unwrap(), b"x");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let path = Path::new("definitely/not/here.png");
        for backend in [Backend::Auto, Backend::Png] {
            let err = backend.load(path).unwrap_err();
            assert!(matches!(err, Error::FileNotFound { .. }), "{backend:?}: {err}");
        }
    }
}
