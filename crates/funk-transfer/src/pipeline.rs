use std::path::Path;

use funk_store::ObjectStoreGateway;
use funk_types::ObjectAttributes;

use crate::error::PipelineResult;
use crate::orchestrator::TransferOrchestrator;

impl<G: ObjectStoreGateway> TransferOrchestrator<G> {
    /// Archive `names` from `source_dir` and upload the archive as `object`.
    ///
    /// The archive is fully built before the container is checked, so an
    /// unreadable input fails without contacting the store.
    pub fn publish<S: AsRef<str>>(
        &self,
        source_dir: &Path,
        names: &[S],
        container: &str,
        object: &str,
    ) -> PipelineResult<ObjectAttributes> {
        let archive = funk_archive::build(source_dir, names)?;
        tracing::debug!(entries = archive.entry_count(), bytes = archive.len(), "publishing archive");
        Ok(self.upload(container, object, archive.as_bytes())?)
    }

    /// Download `object` and extract it into `dest_dir`, returning the file count.
    pub fn fetch(&self, container: &str, object: &str, dest_dir: &Path) -> PipelineResult<usize> {
        let bytes = self.download(container, object)?;
        Ok(funk_archive::extract(dest_dir, bytes.as_slice())?)
    }
}
