//! [`Lot`]-related JSON API.
//!
//! [`Lot`]: domain::Lot

use axum::{
    extract::{Path, Query as UrlQuery},
    Extension, Json,
};
use common::pagination;
use serde::{Deserialize, Serialize};
use service::{command, domain, query, read, Command as _};
use uuid::Uuid;

use crate::{AsError, Error, Service};

/// Default number of [`Lot`]s on a list page.
///
/// [`Lot`]: domain::Lot
const DEFAULT_PAGE_SIZE: u16 = 20;

/// JSON representation of a [`domain::Lot`].
#[derive(Clone, Debug, Serialize)]
pub struct Lot {
    /// Unique identifier.
    pub id: Uuid,

    /// Unique human-readable reference code.
    pub reference: String,

    /// Availability status.
    pub status: String,

    /// Size in square meters.
    pub size: String,

    /// Price per square meter.
    pub price_per_m2: String,

    /// Zoning code.
    pub zoning_code: String,

    /// Free-form description, if any.
    pub description: Option<String>,

    /// Creation timestamp.
    pub created_at: String,
}

impl From<domain::Lot> for Lot {
    fn from(lot: domain::Lot) -> Self {
        Self {
            id: lot.id.into(),
            reference: lot.reference.to_string(),
            status: lot.status.to_string(),
            size: lot.size.to_string(),
            price_per_m2: lot.price_per_m2.to_string(),
            zoning_code: lot.zoning_code.to_string(),
            description: lot.description.map(|d| d.to_string()),
            created_at: lot.created_at.to_rfc3339(),
        }
    }
}

/// Request of the `POST /lots` endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// Unique human-readable reference code.
    pub reference: String,

    /// Size in square meters.
    pub size: String,

    /// Price per square meter (amount with currency code, e.g. `200MAD`).
    pub price_per_m2: String,

    /// Zoning code.
    pub zoning_code: String,

    /// Free-form description.
    pub description: Option<String>,
}

/// Handles the `POST /lots` endpoint.
pub async fn create(
    Extension(service): Extension<Service>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Lot>, Error> {
    let cmd = command::CreateLot {
        reference: req.reference.parse().map_err(|e| Error::bad_request(&e))?,
        size: req.size.parse().map_err(|e| Error::bad_request(&e))?,
        price_per_m2: req
            .price_per_m2
            .parse()
            .map_err(|e| Error::bad_request(&e))?,
        zoning_code: req
            .zoning_code
            .parse()
            .map_err(|e| Error::bad_request(&e))?,
        description: req
            .description
            .map(|d| d.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
    };

    service
        .execute(cmd)
        .await
        .map(|lot| Json(lot.into()))
        .map_err(AsError::into_error)
}

/// Handles the `GET /lots/:id` endpoint.
pub async fn by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Lot>, Error> {
    service
        .execute(query::lot::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|lot| Json(lot.into()))
        .ok_or_else(|| Error::not_found(&format!("`Lot(id: {id})`")))
}

/// Handles the `DELETE /lots/:id` endpoint.
pub async fn delete(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Lot>, Error> {
    service
        .execute(command::DeleteLot { id: id.into() })
        .await
        .map(|lot| Json(lot.into()))
        .map_err(AsError::into_error)
}

/// Query parameters of the `GET /lots` endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Number of items to return, paginating forward.
    pub first: Option<u16>,

    /// Cursor after which the items are returned.
    pub after: Option<Uuid>,

    /// Number of items to return, paginating backward.
    pub last: Option<u16>,

    /// Cursor before which the items are returned.
    pub before: Option<Uuid>,

    /// Reference code (or its part) to fuzzy search for.
    pub reference: Option<String>,

    /// Exact status to filter by.
    pub status: Option<String>,
}

/// Page of the `GET /lots` endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    /// Edges of this page.
    pub edges: Vec<Edge>,

    /// Indicator whether a next page exists.
    pub has_next_page: bool,

    /// Indicator whether a previous page exists.
    pub has_previous_page: bool,

    /// Total count of [`Lot`]s.
    pub total_count: i32,
}

/// Edge of a [`Page`].
#[derive(Clone, Debug, Serialize)]
pub struct Edge {
    /// Cursor of this [`Edge`].
    pub cursor: Uuid,

    /// [`Lot`] of this [`Edge`].
    pub node: Lot,
}

/// Handles the `GET /lots` endpoint.
pub async fn list(
    Extension(service): Extension<Service>,
    UrlQuery(params): UrlQuery<ListParams>,
) -> Result<Json<Page>, Error> {
    let arguments = pagination::Arguments::new(
        params.first,
        params.after.map(Into::into),
        params.last,
        params.before.map(Into::into),
        DEFAULT_PAGE_SIZE,
    )
    .ok_or_else(|| Error::bad_request(&"invalid pagination arguments"))?;

    let filter = read::lot::list::Filter {
        reference: params
            .reference
            .map(|r| r.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
        status: params
            .status
            .map(|s| s.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
    };

    let page = service
        .execute(query::lots::List::by(read::lot::list::Selector {
            arguments,
            filter,
        }))
        .await
        .map_err(AsError::into_error)?;

    let total_count = service
        .execute(query::lots::TotalCount::by(()))
        .await
        .map_err(AsError::into_error)?;

    let info = page.page_info();
    let mut edges = Vec::with_capacity(page.edges.len());
    for edge in page.edges {
        // A `Lot` may be deleted between the two queries.
        let Some(lot) = service
            .execute(query::lot::ById::by(edge.node))
            .await
            .map_err(AsError::into_error)?
        else {
            continue;
        };

        edges.push(Edge {
            cursor: edge.cursor.into(),
            node: lot.into(),
        });
    }

    Ok(Json(Page {
        edges,
        has_next_page: info.has_next_page,
        has_previous_page: info.has_previous_page,
        total_count: total_count.into(),
    }))
}

/// Response of the `POST /lots/reconcile` endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct Released {
    /// IDs of the [`Lot`]s released back to being available.
    pub released: Vec<Uuid>,
}

/// Handles the `POST /lots/reconcile` endpoint.
pub async fn reconcile_orphans(
    Extension(service): Extension<Service>,
) -> Result<Json<Released>, Error> {
    service
        .execute(command::ReconcileOrphans)
        .await
        .map(|ids| {
            Json(Released {
                released: ids.into_iter().map(Into::into).collect(),
            })
        })
        .map_err(AsError::into_error)
}
