//! # Command Protocol
//!
//! One JSON object per line in, one JSON object per line out.
//!
//! ```text
//! → {"op":"getParcel","parcelId":"PARCEL_001"}
//! ← {"ok":true,"result":{...}}
//!
//! → {"op":"approveMutation","parcelId":"PARCEL_001"}
//! ← {"ok":false,"kind":"STATE_CONFLICT","error":"Scrutiny period active: 29 day(s) remaining"}
//! ```
//!
//! Request payloads reuse the registry's own wire types, flattened next to
//! the `op` tag.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::LandUse;
use tl_02_registry::{
    ChildParcelSpec, CreateParcelRequest, IntimationRequest, LandRegistryApi, RegistryError,
    TransferRequest, UnitSpec,
};
use registry_telemetry::log_payment_event;
use tracing::debug;

/// Kind reported for lines that are not valid commands.
pub const BAD_REQUEST: &str = "BAD_REQUEST";

/// A decoded command line.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    CreateParcel(CreateParcelRequest),
    GetParcel {
        parcel_id: String,
    },
    GetPublicParcelDetails {
        parcel_id: String,
    },
    RecordIntimation(IntimationRequest),
    InitiateTransfer(TransferRequest),
    ApproveMutation {
        parcel_id: String,
    },
    ResolveDispute {
        parcel_id: String,
        dispute_id: String,
        #[serde(default)]
        resolution: Option<String>,
    },
    CreateStrataUnit(UnitSpec),
    GetStrataUnit {
        unit_id: String,
    },
    SubdivideParcel {
        parent_id: String,
        children: Vec<ChildParcelSpec>,
    },
    ConvertLandUse {
        parcel_id: String,
        new_use: LandUse,
    },
    FinalizeTitle {
        parcel_id: String,
    },
    /// `payload` may be an embedded object or a JSON-encoded string.
    ExecuteTransaction {
        tx_type: String,
        payload: Value,
        #[serde(default)]
        evidence_ref: String,
    },
    GetPaymentDetails {
        utr: String,
    },
    QueryPendingMutations,
    GetParcelHistory {
        parcel_id: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateParcel(_) => "createParcel",
            Self::GetParcel { .. } => "getParcel",
            Self::GetPublicParcelDetails { .. } => "getPublicParcelDetails",
            Self::RecordIntimation(_) => "recordIntimation",
            Self::InitiateTransfer(_) => "initiateTransfer",
            Self::ApproveMutation { .. } => "approveMutation",
            Self::ResolveDispute { .. } => "resolveDispute",
            Self::CreateStrataUnit(_) => "createStrataUnit",
            Self::GetStrataUnit { .. } => "getStrataUnit",
            Self::SubdivideParcel { .. } => "subdivideParcel",
            Self::ConvertLandUse { .. } => "convertLandUse",
            Self::FinalizeTitle { .. } => "finalizeTitle",
            Self::ExecuteTransaction { .. } => "executeTransaction",
            Self::GetPaymentDetails { .. } => "getPaymentDetails",
            Self::QueryPendingMutations => "queryPendingMutations",
            Self::GetParcelHistory { .. } => "getParcelHistory",
        }
    }
}

/// One response line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Ok { ok: bool, result: Value },
    Err { ok: bool, kind: String, error: String },
}

impl Response {
    pub fn ok(result: Value) -> Self {
        Self::Ok { ok: true, result }
    }

    pub fn error(kind: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Err {
            ok: false,
            kind: kind.into(),
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Error kind, `None` on success.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Ok { .. } => None,
            Self::Err { kind, .. } => Some(kind),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Ok { result, .. } => Some(result),
            Self::Err { .. } => None,
        }
    }
}

impl From<RegistryError> for Response {
    fn from(err: RegistryError) -> Self {
        Self::error(err.kind().as_str(), err.to_string())
    }
}

fn respond<T: Serialize>(result: Result<T, RegistryError>) -> Response {
    match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(value) => Response::ok(value),
            Err(e) => Response::error("CODEC", e.to_string()),
        },
        Err(e) => e.into(),
    }
}

/// Runs one command against the registry.
pub fn handle<A: LandRegistryApi + ?Sized>(api: &A, command: Command) -> Response {
    debug!(op = command.name(), "Handling command");
    match command {
        Command::CreateParcel(request) => respond(api.create_parcel(request)),
        Command::GetParcel { parcel_id } => respond(api.get_parcel(&parcel_id)),
        Command::GetPublicParcelDetails { parcel_id } => {
            respond(api.get_public_parcel_details(&parcel_id))
        }
        Command::RecordIntimation(request) => respond(api.record_intimation(request)),
        Command::InitiateTransfer(request) => {
            let utr = request.terms.utr.clone();
            let result = api.initiate_transfer(request);
            if result.is_ok() {
                log_payment_event!(debug, utr, "Escrow payment locked");
            }
            respond(result)
        }
        Command::ApproveMutation { parcel_id } => respond(api.approve_mutation(&parcel_id)),
        Command::ResolveDispute {
            parcel_id,
            dispute_id,
            resolution,
        } => respond(api.resolve_dispute(&parcel_id, &dispute_id, resolution)),
        Command::CreateStrataUnit(spec) => respond(api.create_strata_unit(spec)),
        Command::GetStrataUnit { unit_id } => respond(api.get_strata_unit(&unit_id)),
        Command::SubdivideParcel {
            parent_id,
            children,
        } => respond(api.subdivide_parcel(&parent_id, children)),
        Command::ConvertLandUse { parcel_id, new_use } => {
            respond(api.convert_land_use(&parcel_id, new_use))
        }
        Command::FinalizeTitle { parcel_id } => respond(api.finalize_title(&parcel_id)),
        Command::ExecuteTransaction {
            tx_type,
            payload,
            evidence_ref,
        } => {
            let payload_json = match payload {
                Value::String(raw) => raw,
                other => other.to_string(),
            };
            respond(api.execute_transaction(&tx_type, &payload_json, &evidence_ref))
        }
        Command::GetPaymentDetails { utr } => respond(api.get_payment_details(&utr)),
        Command::QueryPendingMutations => respond(api.query_pending_mutations()),
        Command::GetParcelHistory { parcel_id } => respond(api.get_parcel_history(&parcel_id)),
    }
}

/// Decodes and runs one input line; `None` for blank lines.
pub fn handle_line<A: LandRegistryApi + ?Sized>(api: &A, line: &str) -> Option<Response> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(match serde_json::from_str::<Command>(line) {
        Ok(command) => handle(api, command),
        Err(e) => Response::error(BAD_REQUEST, e.to_string()),
    })
}
