//! Distribution archive naming and packaging.
//!
//! The distributable is a single archive named after the Chrome version and
//! target, holding `include/`, `lib/` and the build-info file. Linux builds
//! ship as gzip-compressed tarballs and macOS builds as zip files. A
//! `<archive>.sha256` file is written next to each archive.

use crate::error::{BuilderError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// The fixed prefix for all archive names.
const ARCHIVE_PREFIX: &str = "libwebrtc";

/// Container format of the distribution archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tar.
    TarGz,
    /// Deflate zip.
    Zip,
}

impl ArchiveFormat {
    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

/// A distribution archive filename.
///
/// # Examples
///
/// ```
/// use libwebrtc_builder::archive::{ArchiveFormat, ArchiveName};
///
/// let name = ArchiveName::new("1.2.3", "linux", "amd64", ArchiveFormat::TarGz);
/// assert_eq!(name.to_string(), "libwebrtc-1.2.3-linux-amd64.tar.gz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    version: String,
    os: String,
    arch: String,
    format: ArchiveFormat,
}

impl ArchiveName {
    /// Create an archive name from its components.
    #[must_use]
    pub fn new(version: &str, os: &str, arch: &str, format: ArchiveFormat) -> Self {
        Self {
            version: version.to_owned(),
            os: os.to_owned(),
            arch: arch.to_owned(),
            format,
        }
    }

    /// The archive format implied by the name.
    #[must_use]
    pub const fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// Return the filename as an owned string.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ARCHIVE_PREFIX}-{}-{}-{}.{}",
            self.version,
            self.os,
            self.arch,
            self.format.extension()
        )
    }
}

/// Paths produced by packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutput {
    /// The archive.
    pub archive_path: Utf8PathBuf,
    /// The `.sha256` file beside it.
    pub checksum_path: Utf8PathBuf,
}

/// Write `name` into `base_dir`, containing `members` (paths relative to
/// `base_dir`; directories are added recursively), plus a checksum file.
///
/// # Errors
///
/// Returns [`BuilderError::Packaging`] if any member cannot be read or the
/// archive cannot be written.
pub fn package(base_dir: &Utf8Path, members: &[&str], name: &ArchiveName) -> Result<PackageOutput> {
    let archive_path = base_dir.join(name.filename());
    let packaging_error = |e: io::Error| BuilderError::Packaging {
        path: archive_path.clone(),
        reason: e.to_string(),
    };

    match name.format() {
        ArchiveFormat::TarGz => write_tar_gz(&archive_path, base_dir, members),
        ArchiveFormat::Zip => write_zip(&archive_path, base_dir, members),
    }
    .map_err(packaging_error)?;

    let checksum_path = write_checksum(&archive_path)?;
    Ok(PackageOutput {
        archive_path,
        checksum_path,
    })
}

fn write_tar_gz(dest: &Utf8Path, base_dir: &Utf8Path, members: &[&str]) -> io::Result<()> {
    let encoder = GzEncoder::new(File::create(dest)?, Compression::default());
    let mut archive = tar::Builder::new(encoder);

    for member in members {
        let source = base_dir.join(member);
        if source.is_dir() {
            archive.append_dir_all(member, &source)?;
        } else {
            archive.append_path_with_name(&source, member)?;
        }
    }

    archive.into_inner()?.finish()?;
    Ok(())
}

fn write_zip(dest: &Utf8Path, base_dir: &Utf8Path, members: &[&str]) -> io::Result<()> {
    let mut zip = ZipWriter::new(File::create(dest)?);
    let dir_options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let file_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    for member in members {
        for entry in WalkDir::new(base_dir.join(member)).sort_by_file_name() {
            let entry = entry?;
            let Ok(rel) = entry.path().strip_prefix(base_dir) else {
                continue;
            };
            let mut name = rel.to_string_lossy().replace('\\', "/");
            if entry.file_type().is_dir() {
                name.push('/');
                zip.add_directory(name, dir_options)?;
                continue;
            }
            zip.start_file(name, file_options)?;
            io::copy(&mut File::open(entry.path())?, &mut zip)?;
        }
    }

    zip.finish()?;
    Ok(())
}

/// Compute the lowercase hex SHA-256 digest of a file.
///
/// # Errors
///
/// Returns [`BuilderError::Filesystem`] if the file cannot be read.
pub fn compute_sha256(path: &Utf8Path) -> Result<String> {
    let read_error = |e| BuilderError::filesystem(path, e);
    let mut file = File::open(path).map_err(read_error)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer).map_err(read_error)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Write `<archive>.sha256` in `sha256sum` format and return its path.
///
/// # Errors
///
/// Returns [`BuilderError::Filesystem`] on read or write failure.
pub fn write_checksum(archive: &Utf8Path) -> Result<Utf8PathBuf> {
    let digest = compute_sha256(archive)?;
    let file_name = archive.file_name().unwrap_or(archive.as_str());
    let checksum_path = Utf8PathBuf::from(format!("{archive}.sha256"));
    fs::write(&checksum_path, format!("{digest}  {file_name}\n"))
        .map_err(|e| BuilderError::filesystem(&checksum_path, e))?;
    Ok(checksum_path)
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
