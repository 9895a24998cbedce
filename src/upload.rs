use crate::loader::extension_of;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Directory that holds uploads while they are being parsed
#[derive(Clone, Debug)]
pub struct UploadDir {
    path: PathBuf,
}

impl UploadDir {
    /// Use `path` for uploads, creating it if it does not exist yet
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        Ok(UploadDir { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reserve a fresh file for one upload
    ///
    /// The file is named after a random id plus the original extension, so
    /// neither concurrent uploads of the same name nor hostile names like
    /// `../x.csv` can clash or escape the directory.
    ///
    /// # Arguments
    /// * `original_name` - File name the client sent; only its extension is used
    pub fn reserve(&self, original_name: &str) -> io::Result<TempUpload> {
        let id = Uuid::new_v4();
        let suffix = extension_of(Path::new(original_name))
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let file = tempfile::Builder::new()
            .prefix(&id.to_string())
            .suffix(&suffix)
            .rand_bytes(0)
            .tempfile_in(&self.path)?;

        Ok(TempUpload {
            id,
            original_name: original_name.to_string(),
            file,
            bytes_written: 0,
        })
    }
}

/// One uploaded file on disk, removed when dropped
///
/// Dropping the guard deletes the file on every exit path of a request,
/// including early returns and unwinding.
#[derive(Debug)]
pub struct TempUpload {
    id: Uuid,
    original_name: String,
    file: NamedTempFile,
    bytes_written: u64,
}

impl TempUpload {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Append a chunk of the upload body
    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk)?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Flush buffered bytes so readers opening [`path`](Self::path) see them
    pub fn finish(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    /// Delete the file now, reporting failures that a plain drop would hide
    pub fn close(self) -> io::Result<()> {
        self.file.close()
    }
}
