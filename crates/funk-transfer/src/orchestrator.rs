use std::io::{Read, Write};

use funk_store::{ContainerHandle, ObjectStoreGateway, StoreError};
use funk_types::{ObjectAttributes, ObjectRef};

use crate::error::{TransferError, TransferResult, TransferStage};
use crate::state::{Attempt, Direction, TransferState};

/// Cap on the download buffer reserved up front; larger objects grow the
/// buffer as bytes arrive.
const MAX_PREALLOC: u64 = 1024 * 1024;

/// Sequences gateway calls for single-attempt uploads and downloads.
///
/// Each call checks that the container exists before touching the object.
/// That check races with other agents creating or deleting the container;
/// it is a best-effort precondition, not a guarantee. Calls are independent:
/// nothing is shared between them, so one orchestrator can serve several
/// threads when the gateway is shared by reference or `Arc`.
#[derive(Debug)]
pub struct TransferOrchestrator<G> {
    gateway: G,
}

impl<G: ObjectStoreGateway> TransferOrchestrator<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn into_inner(self) -> G {
        self.gateway
    }

    /// Write `content` as `object` in `container` and return its attributes.
    ///
    /// Fails with [`TransferError::ContainerNotFound`] before any write if the
    /// container is absent. A failure after that point may leave a partial or
    /// missing object, depending on the store; nothing is cleaned up or retried.
    pub fn upload(
        &self,
        container: &str,
        object: &str,
        content: &[u8],
    ) -> TransferResult<ObjectAttributes> {
        let handle = self.gateway.resolve_container(container);
        let target = handle.object(object);
        let mut attempt = Attempt::new(Direction::Upload, target.to_string());

        self.check_container(&handle, &target, &mut attempt)?;
        attempt.advance(TransferState::InFlight);

        let mut sink = self
            .gateway
            .open_writer(&handle, object)
            .map_err(|e| attempt.fail(TransferError::at(TransferStage::OpenWriter, &target, e)))?;
        sink.write_all(content)
            .and_then(|()| sink.flush())
            .map_err(|e| attempt.fail(TransferError::at(TransferStage::Write, &target, e)))?;
        sink.commit()
            .map_err(|e| attempt.fail(TransferError::at(TransferStage::Commit, &target, e)))?;

        let attrs = self.gateway.fetch_attributes(&handle, object).map_err(|e| {
            attempt.fail(TransferError::at(TransferStage::FetchAttributes, &target, e))
        })?;

        attempt.advance(TransferState::Completed);
        tracing::info!(
            object = %target,
            size = attrs.size,
            hash = %attrs.content_hash.short_hex(),
            "uploaded object"
        );
        Ok(attrs)
    }

    /// Read the full content of `object` in `container`.
    ///
    /// The result must hold exactly the object's declared length; a source
    /// that ends early or overruns is a [`TransferError::Transfer`] at the
    /// read stage.
    pub fn download(&self, container: &str, object: &str) -> TransferResult<Vec<u8>> {
        let handle = self.gateway.resolve_container(container);
        let target = handle.object(object);
        let mut attempt = Attempt::new(Direction::Download, target.to_string());

        self.check_container(&handle, &target, &mut attempt)?;
        attempt.advance(TransferState::InFlight);

        let buf = {
            // The source is dropped at the end of this block on every path.
            let mut source = self.gateway.open_reader(&handle, object).map_err(|e| {
                attempt.fail(TransferError::at(TransferStage::OpenReader, &target, e))
            })?;
            let expected = source.size();
            let mut buf = Vec::with_capacity(expected.min(MAX_PREALLOC) as usize);
            source
                .read_to_end(&mut buf)
                .map_err(|e| attempt.fail(TransferError::at(TransferStage::Read, &target, e)))?;

            let actual = buf.len() as u64;
            if actual != expected {
                let mismatch = StoreError::SizeMismatch {
                    object: target.clone(),
                    expected,
                    actual,
                };
                return Err(attempt.fail(TransferError::at(TransferStage::Read, &target, mismatch)));
            }
            buf
        };

        attempt.advance(TransferState::Completed);
        tracing::info!(object = %target, size = buf.len(), "downloaded object");
        Ok(buf)
    }

    fn check_container(
        &self,
        handle: &ContainerHandle,
        target: &ObjectRef,
        attempt: &mut Attempt,
    ) -> TransferResult<()> {
        let exists = self.gateway.exists(handle).map_err(|e| {
            attempt.fail(TransferError::at(TransferStage::ExistenceCheck, target, e))
        })?;
        attempt.advance(TransferState::ContainerChecked);
        if !exists {
            tracing::debug!(container = handle.name(), state = %attempt.state(), "container missing");
            return Err(attempt.fail(TransferError::ContainerNotFound {
                container: handle.name().to_string(),
            }));
        }
        Ok(())
    }
}
