//! Request and response records exchanged with the API.
//!
//! Everything serializes with camelCase field names; `None` fields are left
//! out of request bodies instead of being sent as `null`.

mod attachments;
mod batches;
mod common;
mod enums;
mod parts;
mod procedures;
mod runs;
mod stations;
mod units;

pub use attachments::{DeleteAttachmentResponse, InitializeUploadRequest, InitializeUploadResponse};
pub use batches::{Batch, CreateBatchRequest, ListBatchesRequest, UpdateBatchRequest};
pub use common::{DEFAULT_PAGE_LIMIT, DeleteResponse, PaginatedResponse, PaginationMeta};
pub use enums::{LogLevel, MeasurementOutcome, PhaseOutcome, RunOutcome};
pub use parts::{
    CreatePartRequest, CreatePartRevisionRequest, ListPartsRequest, Part, PartRevision,
    UpdatePartRequest, UpdatePartRevisionRequest,
};
pub use procedures::{
    CreateProcedureRequest, CreateProcedureVersionRequest, ListProceduresRequest, Procedure,
    ProcedureVersion, UpdateProcedureRequest,
};
pub use runs::{
    CreateRunLog, CreateRunMeasurement, CreateRunPhase, CreateRunRequest, ListRunsRequest, Run,
    RunAttachment, RunLog, RunMeasurement, RunPhase, UpdateRunRequest,
};
pub use stations::{
    CreateStationRequest, LinkProcedureRequest, ListStationsRequest, Station, UpdateStationRequest,
};
pub use units::{CreateUnitRequest, ListUnitsRequest, Unit, UpdateUnitRequest};
