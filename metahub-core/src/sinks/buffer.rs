//! In-memory image buffer sink

use crate::collaborators::ImageBuffer;
use crate::hub::MetadataHub;
use crate::policy::WriteMode;
use metahub_common::{MetadataSettings, Result};
use tracing::debug;

impl MetadataHub {
    /// Apply the hub to an image buffer's embedded metadata
    ///
    /// Returns `true` only if a blob's stored content changed. Fails only if
    /// the buffer's existing metadata cannot be decoded.
    pub fn write_to_buffer(
        &self,
        image: &mut ImageBuffer,
        mode: WriteMode,
        settings: &MetadataSettings,
    ) -> Result<bool> {
        if !self.will_write(mode, settings) {
            return Ok(false);
        }

        let mut metadata = image.metadata()?;
        if !self.write_to_metadata(&mut metadata, mode, settings) {
            return Ok(false);
        }

        let stored = image.store_metadata(&metadata)?;
        if stored.is_empty() {
            return Ok(false);
        }
        debug!(blobs = ?stored, path = ?image.file_path(), "Updated buffer metadata");
        Ok(true)
    }
}
