//! API routes.
//!
//! - `resource` - generic CRUD handlers mounted once per record type
//! - `documents` - country document upload, listing and download

pub mod documents;
pub mod resource;

use std::sync::Arc;

use axum::Router;
use refdata_core::{
    Country, CountryContact, CountrySector, Record, Region, Sector, SectorDivision, SectorGroup,
    SectorIndustry, SubRegion,
};

use crate::attachments::DocumentService;
use crate::server::AppState;
use crate::service::binding::{
    COUNTRY, COUNTRY_CONTACT, COUNTRY_DOCUMENT, COUNTRY_SECTOR, REGION, SECTOR, SECTOR_DIVISION,
    SECTOR_GROUP, SECTOR_INDUSTRY, SUB_REGION,
};
use crate::service::{ListLimits, ResourceBinding, ResourceService};

pub use documents::{DocumentState, document_routes};
pub use resource::{ListQuery, resource_routes};

/// Every resource router under `server.api_prefix`.
pub fn api_router(state: &AppState) -> Router {
    let prefix = state.config.server.api_prefix.trim_end_matches('/');
    let limits = ListLimits {
        default_limit: state.config.list.default_limit,
        max_limit: state.config.list.max_limit,
    };

    let documents = DocumentService::new(
        Arc::new(service(state, &COUNTRY_DOCUMENT, limits)),
        state.documents.clone(),
        state.config.documents.max_upload_bytes,
    );

    Router::new()
        .merge(mount::<Country>(prefix, state, &COUNTRY, limits))
        .merge(mount::<CountryContact>(prefix, state, &COUNTRY_CONTACT, limits))
        .merge(mount::<CountrySector>(prefix, state, &COUNTRY_SECTOR, limits))
        .merge(mount::<Sector>(prefix, state, &SECTOR, limits))
        .merge(mount::<Region>(prefix, state, &REGION, limits))
        .merge(mount::<SubRegion>(prefix, state, &SUB_REGION, limits))
        .merge(mount::<SectorGroup>(prefix, state, &SECTOR_GROUP, limits))
        .merge(mount::<SectorDivision>(prefix, state, &SECTOR_DIVISION, limits))
        .merge(mount::<SectorIndustry>(prefix, state, &SECTOR_INDUSTRY, limits))
        .merge(document_routes(
            &format!("{prefix}/{}", COUNTRY_DOCUMENT.route),
            DocumentState::new(Arc::new(documents)),
        ))
}

fn service<R: Record>(
    state: &AppState,
    binding: &'static ResourceBinding,
    limits: ListLimits,
) -> ResourceService<R> {
    ResourceService::new(state.store.clone(), state.cache.clone(), binding).with_limits(limits)
}

fn mount<R: Record>(
    prefix: &str,
    state: &AppState,
    binding: &'static ResourceBinding,
    limits: ListLimits,
) -> Router {
    resource_routes::<R>(
        &format!("{prefix}/{}", binding.route),
        Arc::new(service::<R>(state, binding, limits)),
    )
}
