//! Per-resource bindings.
//!
//! Each resource family behaves the same except for a handful of switches:
//! which cache calls it makes, how it answers a missing row on read, and
//! whether its responses are wrapped in `{success, data}`. Those switches
//! live here as data, one static per family.

use axum::http::StatusCode;

/// Which cache mirror calls a resource service makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// `create` puts the new record.
    pub populate_on_create: bool,
    /// `get` answers from the mirror when it has an entry.
    pub read_on_get: bool,
    /// `update` puts the updated record.
    pub refresh_on_update: bool,
    /// `delete` evicts the record.
    pub evict_on_delete: bool,
}

impl CachePolicy {
    /// Never touches the mirror.
    pub const BYPASS: Self = Self {
        populate_on_create: false,
        read_on_get: false,
        refresh_on_update: false,
        evict_on_delete: false,
    };

    /// Writes on create and never reads back.
    pub const WRITE_ON_CREATE: Self = Self {
        populate_on_create: true,
        ..Self::BYPASS
    };

    /// Cache-aside on every operation.
    pub const CACHE_ASIDE: Self = Self {
        populate_on_create: true,
        read_on_get: true,
        refresh_on_update: true,
        evict_on_delete: true,
    };
}

/// Response body layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{"success": true, "data": ...}`
    Enveloped,
    /// The payload itself.
    Bare,
}

/// What `DELETE` answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReply {
    /// `data` is `null`.
    Empty,
    /// The row as it was before deletion.
    Deleted,
}

#[derive(Debug)]
pub struct ResourceBinding {
    /// Table name; also the cache namespace and the metrics label.
    pub name: &'static str,
    /// Path segment under the API prefix, e.g. `sub-region`.
    pub route: &'static str,
    pub cache: CachePolicy,
    /// Status for a missing row on `GET /{id}`. Update and delete always use 404.
    pub missing_on_get: StatusCode,
    /// Layout of single-record responses.
    pub item_shape: Shape,
    /// Layout of list responses.
    pub list_shape: Shape,
    pub delete_reply: DeleteReply,
}

pub static COUNTRY: ResourceBinding = ResourceBinding {
    name: "country",
    route: "country",
    cache: CachePolicy::WRITE_ON_CREATE,
    missing_on_get: StatusCode::UNAUTHORIZED,
    item_shape: Shape::Enveloped,
    list_shape: Shape::Enveloped,
    delete_reply: DeleteReply::Empty,
};

pub static COUNTRY_CONTACT: ResourceBinding = ResourceBinding {
    name: "country_contact",
    route: "country-contact",
    cache: CachePolicy::WRITE_ON_CREATE,
    missing_on_get: StatusCode::UNAUTHORIZED,
    item_shape: Shape::Enveloped,
    list_shape: Shape::Enveloped,
    delete_reply: DeleteReply::Empty,
};

pub static COUNTRY_DOCUMENT: ResourceBinding = ResourceBinding {
    name: "country_document",
    route: "country-document",
    cache: CachePolicy::WRITE_ON_CREATE,
    missing_on_get: StatusCode::UNAUTHORIZED,
    item_shape: Shape::Enveloped,
    list_shape: Shape::Enveloped,
    delete_reply: DeleteReply::Empty,
};

pub static COUNTRY_SECTOR: ResourceBinding = ResourceBinding {
    name: "country_sector",
    route: "country-sector",
    cache: CachePolicy::WRITE_ON_CREATE,
    missing_on_get: StatusCode::UNAUTHORIZED,
    item_shape: Shape::Enveloped,
    list_shape: Shape::Enveloped,
    delete_reply: DeleteReply::Empty,
};

pub static SECTOR: ResourceBinding = ResourceBinding {
    name: "sector",
    route: "sector",
    cache: CachePolicy::WRITE_ON_CREATE,
    missing_on_get: StatusCode::NOT_FOUND,
    item_shape: Shape::Enveloped,
    list_shape: Shape::Enveloped,
    delete_reply: DeleteReply::Empty,
};

pub static REGION: ResourceBinding = ResourceBinding {
    name: "region",
    route: "region",
    cache: CachePolicy::CACHE_ASIDE,
    missing_on_get: StatusCode::NOT_FOUND,
    item_shape: Shape::Bare,
    list_shape: Shape::Bare,
    delete_reply: DeleteReply::Deleted,
};

pub static SUB_REGION: ResourceBinding = ResourceBinding {
    name: "sub_region",
    route: "sub-region",
    cache: CachePolicy::BYPASS,
    missing_on_get: StatusCode::NOT_FOUND,
    item_shape: Shape::Enveloped,
    list_shape: Shape::Bare,
    delete_reply: DeleteReply::Empty,
};

pub static SECTOR_GROUP: ResourceBinding = ResourceBinding {
    name: "sector_group",
    route: "sector-group",
    cache: CachePolicy::CACHE_ASIDE,
    missing_on_get: StatusCode::NOT_FOUND,
    item_shape: Shape::Enveloped,
    list_shape: Shape::Enveloped,
    delete_reply: DeleteReply::Deleted,
};

pub static SECTOR_DIVISION: ResourceBinding = ResourceBinding {
    name: "sector_division",
    route: "sector-division",
    cache: CachePolicy::CACHE_ASIDE,
    missing_on_get: StatusCode::NOT_FOUND,
    item_shape: Shape::Enveloped,
    list_shape: Shape::Enveloped,
    delete_reply: DeleteReply::Deleted,
};

pub static SECTOR_INDUSTRY: ResourceBinding = ResourceBinding {
    name: "sector_industry",
    route: "sector-industry",
    cache: CachePolicy::CACHE_ASIDE,
    missing_on_get: StatusCode::NOT_FOUND,
    item_shape: Shape::Enveloped,
    list_shape: Shape::Enveloped,
    delete_reply: DeleteReply::Deleted,
};

/// Every binding, in route registration order.
pub static BINDINGS: &[&ResourceBinding] = &[
    &REGION,
    &SUB_REGION,
    &COUNTRY,
    &COUNTRY_CONTACT,
    &COUNTRY_DOCUMENT,
    &COUNTRY_SECTOR,
    &SECTOR_INDUSTRY,
    &SECTOR_DIVISION,
    &SECTOR_GROUP,
    &SECTOR,
];
