//! CRUD resource groups.
//!
//! DESIGN
//! ======
//! Razors, blades and usage records share one call shape, so the shape is
//! written once in [`ResourceApi`] and each resource is a marker type
//! implementing [`Resource`].

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ApiClient;
use super::types::{ApiError, ApiRequest, Envelope};
use crate::model::{
    Blade, CreateBladeRequest, CreateRazorRequest, CreateUsageRecordRequest, EntityId, Identified, Page, PageParams,
    Razor, UpdateBladeRequest, UpdateRazorRequest, UpdateUsageRecordRequest, UsageRecord, Validate,
};

/// A backend collection exposed under `/api/v1/{PATH}`.
pub trait Resource: Send + Sync + 'static {
    type Entity: DeserializeOwned + Serialize + Identified + Clone + fmt::Debug + Send + Sync + 'static;
    type Create: Serialize + Validate + Send + Sync;
    type Update: Serialize + Validate + Send + Sync;

    /// Path segment under the versioned base, e.g. `"razors"`.
    const PATH: &'static str;
    /// Human-readable name for logs.
    const NAME: &'static str;
}

pub struct Razors;
pub struct Blades;
pub struct UsageRecords;

impl Resource for Razors {
    type Entity = Razor;
    type Create = CreateRazorRequest;
    type Update = UpdateRazorRequest;
    const PATH: &'static str = "razors";
    const NAME: &'static str = "razor";
}

impl Resource for Blades {
    type Entity = Blade;
    type Create = CreateBladeRequest;
    type Update = UpdateBladeRequest;
    const PATH: &'static str = "blades";
    const NAME: &'static str = "blade";
}

impl Resource for UsageRecords {
    type Entity = UsageRecord;
    type Create = CreateUsageRecordRequest;
    type Update = UpdateUsageRecordRequest;
    const PATH: &'static str = "usage-records";
    const NAME: &'static str = "usage record";
}

/// Typed CRUD calls for one resource.
pub struct ResourceApi<R: Resource> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), _resource: PhantomData }
    }
}

impl<R: Resource> ResourceApi<R> {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client, _resource: PhantomData }
    }

    /// `/api/v1/{PATH}`
    #[must_use]
    pub fn collection_path() -> String {
        super::versioned_path(R::PATH)
    }

    /// `/api/v1/{PATH}/{id}`
    #[must_use]
    pub fn item_path(id: EntityId) -> String {
        format!("{}/{id}", Self::collection_path())
    }

    /// `POST /{PATH}`
    ///
    /// # Errors
    ///
    /// [`ApiError::Invalid`] when the payload fails validation; otherwise any
    /// transport error.
    pub async fn create(&self, payload: &R::Create) -> Result<Envelope<R::Entity>, ApiError> {
        ensure_valid(payload.validate())?;
        let body = to_body(payload)?;
        self.client.call(ApiRequest::post(Self::collection_path(), body)).await
    }

    /// `GET /{PATH}/{id}`. A missing entity is an `Ok` envelope with `success:false`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Invalid`] for id 0; otherwise any transport error.
    pub async fn get_by_id(&self, id: EntityId) -> Result<Envelope<R::Entity>, ApiError> {
        ensure_positive(id)?;
        self.client.call(ApiRequest::get(Self::item_path(id))).await
    }

    /// `GET /{PATH}?page=&page_size=`. Absent params are left to the server.
    ///
    /// # Errors
    ///
    /// [`ApiError::Invalid`] for out-of-range params; otherwise any transport error.
    pub async fn get_list(&self, params: Option<PageParams>) -> Result<Envelope<Page<R::Entity>>, ApiError> {
        let query = match params {
            Some(params) => {
                ensure_valid(params.validate())?;
                params.to_query()
            }
            None => Vec::new(),
        };
        self.client
            .call(ApiRequest::get(Self::collection_path()).with_query(query))
            .await
    }

    /// `PUT /{PATH}/{id}` with only the supplied fields.
    ///
    /// # Errors
    ///
    /// [`ApiError::Invalid`] for id 0 or an invalid patch; otherwise any transport error.
    pub async fn update(&self, id: EntityId, patch: &R::Update) -> Result<Envelope<R::Entity>, ApiError> {
        ensure_positive(id)?;
        ensure_valid(patch.validate())?;
        let body = to_body(patch)?;
        self.client.call(ApiRequest::put(Self::item_path(id), body)).await
    }

    /// `DELETE /{PATH}/{id}`
    ///
    /// # Errors
    ///
    /// [`ApiError::Invalid`] for id 0; otherwise any transport error.
    pub async fn delete(&self, id: EntityId) -> Result<Envelope<()>, ApiError> {
        ensure_positive(id)?;
        self.client.call(ApiRequest::delete(Self::item_path(id))).await
    }
}

fn ensure_positive(id: EntityId) -> Result<(), ApiError> {
    if id == 0 {
        return Err(ApiError::Invalid("id must be a positive integer".to_owned()));
    }
    Ok(())
}

fn ensure_valid(errors: Vec<String>) -> Result<(), ApiError> {
    if errors.is_empty() {
        return Ok(());
    }
    Err(ApiError::Invalid(errors.join("; ")))
}

fn to_body(payload: &impl Serialize) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::Invalid(e.to_string()))
}
