//! # Request Handler
//!
//! Turns [`ApiRequest`] values into [`ApiResponse`] values.
//!
//! Taxonomy errors become structured rejections the caller can act on.
//! Everything else (storage, corruption, counter misconfiguration) becomes
//! an opaque 500; nothing is retried here, since retrying a failed issue
//! could hand out a number twice.

use serde::Serialize;
use serde_json::{json, Value};

use super::types::{ApiRequest, ApiResponse, AvalView};
use crate::domain::entities::AvalRecord;
use crate::domain::errors::AvalError;
use crate::domain::query::{AvalFilters, Paging};
use crate::ports::inbound::AvalRegistryApi;

/// Request handler over any registry implementation.
pub struct AvalApiHandler<S: AvalRegistryApi> {
    service: S,
}

impl<S: AvalRegistryApi> AvalApiHandler<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn into_inner(self) -> S {
        self.service
    }

    /// Dispatch one request.
    pub fn handle(&mut self, request: ApiRequest) -> ApiResponse {
        let result = match request {
            ApiRequest::Health => Ok(ApiResponse::ok(json!({ "ok": true }))),
            ApiRequest::CreateAval { payload } => self
                .service
                .create_aval(&payload)
                .and_then(|r| view(&r).map(ApiResponse::created)),
            ApiRequest::ListAvales {
                filters,
                limit,
                offset,
            } => self.handle_list(AvalFilters::from(&filters), limit, offset),
            ApiRequest::GetAval { id } => check_id(id).and_then(|_| {
                self.service
                    .get_aval(id)
                    .and_then(|r| view(&r).map(ApiResponse::ok))
            }),
            ApiRequest::EditAval { id, fields } => check_id(id).and_then(|_| {
                self.service
                    .edit_fields(id, &fields)
                    .and_then(|r| view(&r).map(ApiResponse::ok))
            }),
            ApiRequest::VoidAval { id, motivo } => check_id(id).and_then(|_| {
                self.service
                    .void_aval(id, &motivo)
                    .and_then(|r| view(&r).map(ApiResponse::ok))
            }),
        };

        result.unwrap_or_else(|err| error_response(&err))
    }

    fn handle_list(
        &self,
        filters: AvalFilters,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<ApiResponse, AvalError> {
        let paging = match (limit, offset) {
            (None, None) => None,
            (limit, offset) => Some(Paging::new(
                limit.unwrap_or(DEFAULT_PAGE_LIMIT),
                offset.unwrap_or(0),
            )),
        };

        let page = self.service.list_avales(&filters, paging)?;
        let items = page
            .items
            .iter()
            .map(view)
            .collect::<Result<Vec<Value>, _>>()?;

        Ok(ApiResponse::ok(match paging {
            None => Value::Array(items),
            Some(_) => json!({ "items": items, "total": page.total }),
        }))
    }
}

/// Page size used when only an offset is supplied.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

fn view(record: &AvalRecord) -> Result<Value, AvalError> {
    to_body(&AvalView::from(record))
}

/// JSON body for a response; encoding failures are internal errors.
fn to_body<T: Serialize>(value: &T) -> Result<Value, AvalError> {
    serde_json::to_value(value).map_err(|e| AvalError::SerializationError {
        message: e.to_string(),
    })
}

fn check_id(id: u64) -> Result<(), AvalError> {
    if id == 0 {
        return Err(AvalError::validation("Invalid id", ["id"]));
    }
    Ok(())
}

/// Map an error to its response.
pub fn error_response(err: &AvalError) -> ApiResponse {
    if !err.is_rejection() {
        tracing::error!(kind = err.kind(), error = %err, "Request failed");
        return ApiResponse {
            status: 500,
            body: json!({ "error": "Internal error", "kind": "Internal" }),
        };
    }

    let status = match err {
        AvalError::NotFound { .. } => 404,
        _ => 400,
    };
    let mut body = json!({ "error": err.to_string(), "kind": err.kind() });
    if let AvalError::ValidationError { fields, .. } = err {
        if !fields.is_empty() {
            body["fields"] = json!(fields);
        }
    }
    if let AvalError::ForbiddenField { field } = err {
        body["fields"] = json!([field]);
    }

    ApiResponse { status, body }
}
