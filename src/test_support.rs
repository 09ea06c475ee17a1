//! In-memory backend for unit tests.
//!
//! `FakeBackend` implements [`Transport`] and answers the way the real
//! service does: envelopes everywhere, failure envelopes with 4xx/5xx
//! statuses, default paging, newest-first usage records. Every request is
//! logged for assertions, and transport failures or logical rejections can
//! be queued for the next call.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::api::{ApiError, ApiReply, ApiRequest, HEALTH_PATH, Transport};
use crate::model::page::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::model::statistics::DASHBOARD_RECENT_LIMIT;
use crate::model::{EntityId, total_pages};

pub(crate) const RAZORS: &str = "razors";
pub(crate) const BLADES: &str = "blades";
pub(crate) const USAGE_RECORDS: &str = "usage-records";

const STAMP: &str = "2024-01-01T00:00:00Z";

#[derive(Default)]
struct FakeInner {
    collections: BTreeMap<&'static str, BTreeMap<EntityId, Value>>,
    next_id: EntityId,
    log: Vec<ApiRequest>,
    /// Keyed by the position of the call in `log`.
    transport_failures: BTreeMap<usize, ApiError>,
    rejections: BTreeMap<usize, String>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    inner: Mutex<FakeInner>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an entity; uses its `id` when present, otherwise assigns one.
    pub(crate) fn seed(&self, collection: &'static str, entity: Value) -> EntityId {
        let mut inner = self.lock();
        inner.insert(collection, entity)
    }

    pub(crate) fn seed_razor(&self, brand: &str, model: &str) -> EntityId {
        self.seed(RAZORS, json!({ "brand": brand, "model": model, "notes": "" }))
    }

    pub(crate) fn seed_blade(&self, brand: &str, model: &str, quantity: i64) -> EntityId {
        self.seed(
            BLADES,
            json!({
                "brand": brand,
                "model": model,
                "compatible_razors": "",
                "total_quantity": quantity,
                "remaining_quantity": quantity,
                "notes": ""
            }),
        )
    }

    pub(crate) fn seed_record(&self, usage_time: &str, razor_id: EntityId, blade_id: EntityId, rating: Option<u8>) -> EntityId {
        let mut inner = self.lock();
        let body = json!({
            "usage_time": usage_time,
            "razor_id": razor_id,
            "blade_id": blade_id,
            "rating": rating,
        });
        let record = inner.build_record(body);
        inner.insert(USAGE_RECORDS, record)
    }

    pub(crate) fn count(&self, collection: &'static str) -> usize {
        self.lock().collections.get(collection).map_or(0, BTreeMap::len)
    }

    /// `(METHOD, path?query)` for every request received, in order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock()
            .log
            .iter()
            .map(|req| {
                let query: Vec<String> = req.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
                if query.is_empty() {
                    format!("{} {}", req.method, req.path)
                } else {
                    format!("{} {}?{}", req.method, req.path, query.join("&"))
                }
            })
            .collect()
    }

    pub(crate) fn last_request(&self) -> Option<ApiRequest> {
        self.lock().log.last().cloned()
    }

    pub(crate) fn clear_calls(&self) {
        self.lock().log.clear();
    }

    /// Fail the next call at the transport level.
    pub(crate) fn fail_next(&self, error: ApiError) {
        self.fail_after(0, error);
    }

    /// Fail the call that comes after `skip` further calls.
    pub(crate) fn fail_after(&self, skip: usize, error: ApiError) {
        let mut inner = self.lock();
        let at = inner.log.len() + skip;
        inner.transport_failures.insert(at, error);
    }

    /// Answer the next call with a `success:false` envelope (HTTP 500).
    pub(crate) fn reject_next(&self, reason: &str) {
        let mut inner = self.lock();
        let at = inner.log.len();
        inner.rejections.insert(at, reason.to_owned());
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn execute(&self, request: ApiRequest) -> Result<ApiReply, ApiError> {
        let mut inner = self.lock();
        let position = inner.log.len();
        inner.log.push(request.clone());
        if let Some(error) = inner.transport_failures.remove(&position) {
            return Err(error);
        }
        if let Some(reason) = inner.rejections.remove(&position) {
            return Ok(failure(500, &reason));
        }
        Ok(inner.route(&request))
    }
}

impl FakeInner {
    fn insert(&mut self, collection: &'static str, mut entity: Value) -> EntityId {
        let id = match entity.get("id").and_then(Value::as_u64) {
            Some(id) => id,
            None => {
                self.next_id += 1;
                self.next_id
            }
        };
        self.next_id = self.next_id.max(id);
        if let Some(map) = entity.as_object_mut() {
            map.insert("id".into(), json!(id));
            map.entry("created_at").or_insert_with(|| json!(STAMP));
            map.entry("updated_at").or_insert_with(|| json!(STAMP));
        }
        self.collections.entry(collection).or_default().insert(id, entity);
        id
    }

    fn route(&mut self, req: &ApiRequest) -> ApiReply {
        if req.path == HEALTH_PATH && req.method.as_str() == "GET" {
            return success(Some(json!({ "status": "healthy", "timestamp": "2024-01-01 00:00:00" })), "ok");
        }
        let Some(rest) = req.path.strip_prefix("/api/v1/") else {
            return plain_not_found();
        };
        let segments: Vec<&str> = rest.split('/').collect();
        match (req.method.as_str(), segments.as_slice()) {
            ("GET", ["dashboard"]) => self.dashboard(),
            ("GET", ["statistics"]) => success(Some(self.statistics()), "ok"),
            (method, [collection, tail @ ..]) => {
                let Some(collection) = known_collection(collection) else {
                    return plain_not_found();
                };
                match (method, tail) {
                    ("GET", []) => self.list(collection, &req.query),
                    ("POST", []) => self.create(collection, req.body.clone().unwrap_or(Value::Null)),
                    ("GET", [id]) => self.with_id(id, |inner, id| inner.get(collection, id)),
                    ("PUT", [id]) => {
                        let body = req.body.clone().unwrap_or(Value::Null);
                        self.with_id(id, |inner, id| inner.update(collection, id, body))
                    }
                    ("DELETE", [id]) => self.with_id(id, |inner, id| inner.delete(collection, id)),
                    _ => plain_not_found(),
                }
            }
            _ => plain_not_found(),
        }
    }

    fn with_id(&mut self, raw: &str, f: impl FnOnce(&mut Self, EntityId) -> ApiReply) -> ApiReply {
        match raw.parse::<EntityId>() {
            Ok(id) => f(self, id),
            Err(_) => failure(400, "invalid id parameter"),
        }
    }

    fn list(&self, collection: &'static str, query: &[(String, String)]) -> ApiReply {
        let param = |key: &str, default: u32| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.parse::<u32>().ok())
                .unwrap_or(default)
        };
        let page = param("page", DEFAULT_PAGE);
        let page_size = param("page_size", DEFAULT_PAGE_SIZE);
        if page == 0 || page_size == 0 || page_size > MAX_PAGE_SIZE {
            return failure(400, "invalid pagination parameters");
        }

        let all = self.sorted(collection);
        let total = all.len() as u64;
        let offset = ((page - 1) * page_size) as usize;
        let items: Vec<Value> = all.into_iter().skip(offset).take(page_size as usize).collect();
        success(
            Some(json!({
                "items": items,
                "page": page,
                "page_size": page_size,
                "total": total,
                "total_pages": total_pages(total, page_size),
            })),
            "ok",
        )
    }

    fn sorted(&self, collection: &'static str) -> Vec<Value> {
        let mut all: Vec<Value> = self
            .collections
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();
        if collection == USAGE_RECORDS {
            all.sort_by(|a, b| b["usage_time"].as_str().cmp(&a["usage_time"].as_str()));
        }
        all
    }

    fn get(&self, collection: &'static str, id: EntityId) -> ApiReply {
        match self.collections.get(collection).and_then(|c| c.get(&id)) {
            Some(entity) => success(Some(entity.clone()), "ok"),
            None => failure(404, "record not found"),
        }
    }

    fn create(&mut self, collection: &'static str, body: Value) -> ApiReply {
        if !body.is_object() {
            return failure(400, "request body must be an object");
        }
        let entity = if collection == USAGE_RECORDS {
            let razor_id = body["razor_id"].as_u64().unwrap_or(0);
            let blade_id = body["blade_id"].as_u64().unwrap_or(0);
            if !self.exists(RAZORS, razor_id) {
                return failure(500, "razor not found");
            }
            if !self.exists(BLADES, blade_id) {
                return failure(500, "blade not found");
            }
            self.build_record(body)
        } else {
            for field in ["brand", "model"] {
                if body[field].as_str().is_none_or(str::is_empty) {
                    return failure(400, &format!("{field} is required"));
                }
            }
            body
        };
        let id = self.insert(collection, entity);
        self.get(collection, id)
    }

    fn update(&mut self, collection: &'static str, id: EntityId, body: Value) -> ApiReply {
        let Some(patch) = body.as_object().cloned() else {
            return failure(400, "request body must be an object");
        };
        let Some(entity) = self.collections.get_mut(collection).and_then(|c| c.get_mut(&id)) else {
            return failure(404, "record not found");
        };
        if let Some(map) = entity.as_object_mut() {
            for (key, value) in patch {
                map.insert(key, value);
            }
        }
        self.get(collection, id)
    }

    fn delete(&mut self, collection: &'static str, id: EntityId) -> ApiReply {
        match self.collections.get_mut(collection).and_then(|c| c.remove(&id)) {
            Some(_) => success(None, "deleted"),
            None => failure(404, "record not found"),
        }
    }

    fn exists(&self, collection: &'static str, id: EntityId) -> bool {
        self.collections.get(collection).is_some_and(|c| c.contains_key(&id))
    }

    fn build_record(&self, body: Value) -> Value {
        let mut record: Map<String, Value> = body.as_object().cloned().unwrap_or_default();
        let count = record.get("blade_usage_count").and_then(Value::as_u64).unwrap_or(0);
        record.insert("blade_usage_count".into(), json!(count.max(1)));
        record.entry("experience_text").or_insert_with(|| json!(""));
        record.entry("need_blade_change").or_insert_with(|| json!(false));
        let lookup = |collection: &'static str, key: &str| {
            record
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|id| self.collections.get(collection).and_then(|c| c.get(&id)).cloned())
                .unwrap_or(Value::Null)
        };
        let razor = lookup(RAZORS, "razor_id");
        let blade = lookup(BLADES, "blade_id");
        record.insert("razor".into(), razor);
        record.insert("blade".into(), blade);
        Value::Object(record)
    }

    fn statistics(&self) -> Value {
        let records = self.sorted(USAGE_RECORDS);
        let ratings: Vec<f64> = records.iter().filter_map(|r| r["rating"].as_f64()).collect();
        let average = if ratings.is_empty() { 0.0 } else { ratings.iter().sum::<f64>() / ratings.len() as f64 };
        json!({
            "total_usage": records.len(),
            "razor_count": self.collections.get(RAZORS).map_or(0, BTreeMap::len),
            "blade_count": self.collections.get(BLADES).map_or(0, BTreeMap::len),
            "average_rating": average,
        })
    }

    fn dashboard(&self) -> ApiReply {
        let recent: Vec<Value> = self.sorted(USAGE_RECORDS).into_iter().take(DASHBOARD_RECENT_LIMIT).collect();
        success(Some(json!({ "statistics": self.statistics(), "recent_records": recent })), "ok")
    }
}

fn known_collection(segment: &str) -> Option<&'static str> {
    [RAZORS, BLADES, USAGE_RECORDS].into_iter().find(|c| *c == segment)
}

fn success(data: Option<Value>, message: &str) -> ApiReply {
    let mut body = json!({ "success": true, "message": message });
    if let Some(data) = data {
        body["data"] = data;
    }
    ApiReply { status: 200, body: body.to_string() }
}

fn failure(status: u16, error: &str) -> ApiReply {
    ApiReply {
        status,
        body: json!({ "success": false, "message": "operation failed", "error": error }).to_string(),
    }
}

fn plain_not_found() -> ApiReply {
    ApiReply { status: 404, body: "404 page not found".into() }
}
