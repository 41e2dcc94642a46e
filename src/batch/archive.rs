use std::io::Write;

use bytes::Bytes;
use zip::write::FileOptions;

use crate::batch::types::ArchiveError;

/// Append-only container of encoded outputs. Entries are kept in insertion
/// order and land under a folder inside the generated zip.
pub struct Archive {
    folder: String,
    entries: Vec<(String, Bytes)>,
}

impl Archive {
    pub fn new() -> Self {
        Self::with_folder("images")
    }

    pub fn with_folder(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            entries: Vec::new(),
        }
    }

    /// Append one named entry. Names are caller-assigned; the archive never
    /// renames or overwrites.
    pub fn file(&mut self, name: impl Into<String>, data: Bytes) {
        self.entries.push((name.into(), data));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Bytes> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data)
    }

    /// Package all entries into zip bytes, on demand. An empty archive is an
    /// error: there is nothing to save.
    pub fn generate(&self) -> Result<Bytes, ArchiveError> {
        if self.entries.is_empty() {
            return Err(ArchiveError::Empty);
        }

        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Stored);
            for (name, data) in &self.entries {
                writer.start_file(format!("{}/{}", self.folder, name), options)?;
                writer.write_all(data)?;
            }
            writer.finish()?;
        }
        Ok(Bytes::from(cursor.into_inner()))
    }
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "archive_test.rs"]
mod archive_test;
