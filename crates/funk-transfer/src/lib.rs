//! Transfer orchestration for funk.
//!
//! Moves archive bytes to and from an object store through an
//! [`ObjectStoreGateway`](funk_store::ObjectStoreGateway). Every upload and
//! download is a single attempt that first checks the container exists:
//!
//! - **Upload**: existence check -> open writer -> write -> commit -> fetch attributes
//! - **Download**: existence check -> open reader -> read to end -> release
//!
//! Failures are reported as [`TransferError::ContainerNotFound`] when the
//! precondition fails, or [`TransferError::Transfer`] carrying the failing
//! [`TransferStage`] and the store's error. Nothing is retried.

pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod state;

pub use error::{PipelineError, PipelineResult, TransferError, TransferResult, TransferStage};
pub use orchestrator::TransferOrchestrator;
pub use state::{Direction, TransferState};
