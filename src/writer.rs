use crate::{
    error::{Error, Result},
    file::GeneratedFile,
};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info};

/// Materializes parsed file descriptors under the output root.
///
/// The root is created if absent and reused as-is if present; stale files
/// from earlier runs are not cleared. Descriptor paths are confined to the
/// root: a path that climbs out via `..`, or carries an absolute root or
/// drive prefix beyond a leading separator, is rejected.
pub(crate) struct Materializer {
    output_dir: PathBuf,
}

impl Materializer {
    /// Creates a materializer targeting the given output root.
    pub(crate) fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Writes every descriptor to disk, in order.
    ///
    /// Later duplicates overwrite earlier entries. Returns the total number
    /// of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if a descriptor path escapes the output root, or if
    /// directory creation or a file write fails.
    pub(crate) fn write_files(&self, files: &[GeneratedFile]) -> Result<u64> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))?;

        info!(
            "Writing {} files to {}",
            files.len(),
            self.output_dir.display()
        );

        let mut bytes_written = 0u64;
        for file in files {
            bytes_written += self.write_file(file)?;
        }

        info!("Successfully wrote {} generated files", files.len());
        Ok(bytes_written)
    }

    /// Writes a single descriptor to its target path.
    fn write_file(&self, file: &GeneratedFile) -> Result<u64> {
        let relative = sanitize_path(&file.path)?;
        let target = self.output_dir.join(&relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        fs::write(&target, &file.content).map_err(|e| Error::io(&target, e))?;

        debug!(
            "Wrote {} ({} bytes) to {}",
            file.path,
            file.size(),
            target.display()
        );

        Ok(file.size() as u64)
    }

    /// Returns the output root this materializer writes under.
    pub(crate) fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Normalizes a descriptor path into a safe root-relative path.
///
/// A leading separator is stripped. `.` components are dropped and `..`
/// components pop the previous one; popping past the start means the path
/// escapes the root and is rejected, as are drive prefixes and paths that
/// normalize to nothing.
fn sanitize_path(raw: &str) -> Result<PathBuf> {
    let trimmed = raw.trim_start_matches(['/', '\\']);

    let mut normalized = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(Error::unsafe_path(raw));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::unsafe_path(raw));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(Error::unsafe_path(raw));
    }

    Ok(normalized)
}
