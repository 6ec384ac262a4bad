//! Archive member lookup and extraction
//!
//! Blocking code; callers run it on the blocking thread pool.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::{error, info};
use zip::ZipArchive;

use crate::app::datasets::MemberPattern;
use crate::errors::{FetchError, FetchResult};

/// Member extracted from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMember {
    /// Name of the member inside the archive
    pub member_name: String,
    /// Where its content was written
    pub path: PathBuf,
}

/// Names of all members, in archive listing order
pub fn list_members<R: io::Read + io::Seek>(
    archive: &mut ZipArchive<R>,
) -> io::Result<Vec<String>> {
    let mut members = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(io::Error::other)?;
        members.push(entry.name().to_string());
    }
    Ok(members)
}

/// Extract the first member matching `pattern` into `output_dir`
///
/// # Errors
///
/// - `FetchError::CorruptArchive` if the archive cannot be opened or the
///   member cannot be decompressed
/// - `FetchError::MemberNotFound` with the full listing if nothing matches
/// - `FetchError::Storage` if the output file cannot be created
pub fn extract_member(
    archive_path: &Path,
    pattern: &MemberPattern,
    output_dir: &Path,
) -> FetchResult<ExtractedMember> {
    let corrupt = |reason: String| FetchError::CorruptArchive {
        path: archive_path.to_path_buf(),
        reason,
    };

    let file = File::open(archive_path).map_err(|e| corrupt(e.to_string()))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| {
        error!("Failed to open archive {}: {}", archive_path.display(), e);
        corrupt(e.to_string())
    })?;

    let members = list_members(&mut archive).map_err(|e| corrupt(e.to_string()))?;

    let Some(index) = members
        .iter()
        .position(|name| !name.ends_with('/') && pattern.matches(name))
    else {
        error!("Members found in archive: {:?}", members);
        return Err(FetchError::MemberNotFound {
            expected: pattern.suffix.clone(),
            members,
        });
    };

    let mut entry = archive
        .by_index(index)
        .map_err(|e| corrupt(e.to_string()))?;
    let member_name = entry.name().to_string();

    // Only the base name is used so entries cannot escape the output dir
    let file_name = entry
        .enclosed_name()
        .and_then(|p| p.file_name().map(|n| n.to_os_string()))
        .unwrap_or_else(|| pattern.canonical_name.clone().into());
    let output_path = output_dir.join(file_name);

    let mut output = File::create(&output_path).map_err(|source| FetchError::Storage {
        path: output_path.clone(),
        source,
    })?;
    io::copy(&mut entry, &mut output).map_err(|e| corrupt(format!("{}: {}", member_name, e)))?;

    info!("Extracted member: {}", member_name);
    Ok(ExtractedMember {
        member_name,
        path: output_path,
    })
}
