use crate::error::{Error, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Bundles the materialized output tree into a single zip archive.
///
/// Every regular file under the output root becomes one entry, named by its
/// root-relative path with `/` separators. The walk is sorted by file name
/// so the archive layout is deterministic. Any archive already present at
/// the target path is overwritten.
pub(crate) struct Archiver {
    output_dir: PathBuf,
    archive_path: PathBuf,
}

impl Archiver {
    /// Creates an archiver for the given output root and archive path.
    pub(crate) fn new(output_dir: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            archive_path: archive_path.into(),
        }
    }

    /// Walks the output root and writes the archive.
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns an error if the walk encounters an unreadable entry, a file
    /// cannot be read, or the archive cannot be created or finalized.
    pub(crate) fn archive(&self) -> Result<usize> {
        let file =
            fs::File::create(&self.archive_path).map_err(|e| Error::io(&self.archive_path, e))?;
        let mut zip = ZipWriter::new(file);

        // Fixed mtime keeps archives byte-identical across repeated runs.
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        let mut entries = 0usize;
        for entry in WalkDir::new(&self.output_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map_or_else(|| self.output_dir.clone(), Path::to_path_buf);
                Error::io(path, e.into())
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let name = self.entry_name(entry.path())?;
            let content = fs::read(entry.path()).map_err(|e| Error::io(entry.path(), e))?;

            zip.start_file(name.as_str(), options)?;
            zip.write_all(&content)
                .map_err(|e| Error::io(&self.archive_path, e))?;

            debug!("Added archive entry {} ({} bytes)", name, content.len());
            entries += 1;
        }

        zip.finish()?;

        info!(
            "Archived {} entries into {}",
            entries,
            self.archive_path.display()
        );
        Ok(entries)
    }

    /// Converts an absolute file path into a `/`-separated entry name
    /// relative to the output root.
    fn entry_name(&self, path: &Path) -> Result<String> {
        let relative = path
            .strip_prefix(&self.output_dir)
            .map_err(|_| Error::io(path, std::io::Error::other("file outside output root")))?;

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        Ok(parts.join("/"))
    }

    /// Returns the path of the archive this archiver produces.
    pub(crate) fn archive_path(&self) -> &Path {
        &self.archive_path
    }
}
