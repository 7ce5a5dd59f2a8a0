//! Read and write access to SIMs

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use simfleet_api::{
    ApiErrorBody, MutationPatch, RemoteError, RemoteResult, SimRecord, UsageSample,
};
use simfleet_util::{format_date, Iccid};
use std::sync::Arc;
use tracing::debug;

use crate::{ApiRequest, Transport};

pub const SIMS_PATH: &str = "/v1/sims";

/// Path of one SIM, optionally followed by a sub-resource
pub fn sim_path(iccid: &Iccid, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{}/{}/{}", SIMS_PATH, iccid, suffix),
        None => format!("{}/{}", SIMS_PATH, iccid),
    }
}

/// A decoded read together with the status it came with
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub status: u16,
    pub value: T,
}

/// Outcome of a write: the API only reports a status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
    pub message: String,
}

/// Authenticated access to the SIM collection.
///
/// Calls are issued one at a time and never retried.
pub struct SimRepository {
    transport: Arc<dyn Transport>,
    token: String,
}

impl SimRepository {
    pub fn new(transport: Arc<dyn Transport>, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
        }
    }

    /// Send an authenticated read. A `message` field in the payload means
    /// the API is reporting an error and is surfaced instead of the data.
    async fn read(&self, request: ApiRequest) -> RemoteResult<Fetched<Value>> {
        let response = self
            .transport
            .send(request.bearer(&self.token))
            .await?
            .error_for_status()?;

        let payload = response.json()?;
        if let Some(message) = ApiErrorBody::embedded_message(&payload) {
            return Err(RemoteError::api(message));
        }

        Ok(Fetched {
            status: response.status,
            value: payload,
        })
    }

    async fn read_as<T: DeserializeOwned>(&self, request: ApiRequest) -> RemoteResult<Fetched<T>> {
        let fetched = self.read(request).await?;
        let value = serde_json::from_value(fetched.value).map_err(RemoteError::decode)?;
        Ok(Fetched {
            status: fetched.status,
            value,
        })
    }

    async fn write(&self, request: ApiRequest) -> RemoteResult<Ack> {
        let response = self.transport.send(request.bearer(&self.token)).await?;
        Ok(Ack {
            status: response.status,
            message: response.message(),
        })
    }

    /// Full current state of one SIM
    pub async fn get_one(&self, iccid: &Iccid) -> RemoteResult<Fetched<SimRecord>> {
        self.read_as(ApiRequest::get(sim_path(iccid, None))).await
    }

    /// One page of the SIM collection; paging is up to the caller
    pub async fn list_page(&self, page: u32, page_size: u32) -> RemoteResult<Fetched<Vec<SimRecord>>> {
        debug!(page, page_size, "Listing SIMs");
        self.read_as(
            ApiRequest::get(SIMS_PATH)
                .query("page", page)
                .query("pageSize", page_size),
        )
        .await
    }

    pub async fn status(&self, iccid: &Iccid) -> RemoteResult<Fetched<Value>> {
        self.read(ApiRequest::get(sim_path(iccid, Some("status")))).await
    }

    pub async fn quota_data(&self, iccid: &Iccid) -> RemoteResult<Fetched<Value>> {
        self.read(ApiRequest::get(sim_path(iccid, Some("quota/data")))).await
    }

    pub async fn connectivity_info(&self, iccid: &Iccid) -> RemoteResult<Fetched<Value>> {
        self.read(ApiRequest::get(sim_path(iccid, Some("connectivity_info"))))
            .await
    }

    pub async fn events(
        &self,
        iccid: &Iccid,
        page: u32,
        page_size: u32,
        sort: &str,
    ) -> RemoteResult<Fetched<Value>> {
        self.read(
            ApiRequest::get(sim_path(iccid, Some("events")))
                .query("page", page)
                .query("pageSize", page_size)
                .query("sort", sort),
        )
        .await
    }

    /// Daily usage between two dates, inclusive
    pub async fn usage(
        &self,
        iccid: &Iccid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RemoteResult<Fetched<Vec<UsageSample>>> {
        let fetched = self
            .read(
                ApiRequest::get(sim_path(iccid, Some("usage")))
                    .query("start_dt", format_date(start))
                    .query("end_dt", format_date(end)),
            )
            .await?;

        let samples = UsageSample::from_report(&fetched.value).map_err(RemoteError::decode)?;
        Ok(Fetched {
            status: fetched.status,
            value: samples,
        })
    }

    /// Trigger an asynchronous connectivity reset
    pub async fn reset_connectivity(&self, iccid: &Iccid) -> RemoteResult<Ack> {
        self.write(ApiRequest::post(sim_path(iccid, Some("reset")))).await
    }

    /// Submit every patch in one request
    pub async fn bulk_update(&self, patches: &[MutationPatch]) -> RemoteResult<Ack> {
        let body = serde_json::to_value(patches).map_err(RemoteError::decode)?;
        debug!(count = patches.len(), "Submitting bulk update");
        self.write(ApiRequest::post(SIMS_PATH).json(body)).await
    }
}
