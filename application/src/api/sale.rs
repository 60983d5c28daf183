//! [`Sale`]-related JSON API.
//!
//! [`Sale`]: domain::Sale

use axum::{extract::Path, Extension, Json};
use serde::{Deserialize, Serialize};
use service::{command, domain, query, Command as _};
use uuid::Uuid;

use crate::{AsError, Error, Service};

/// JSON representation of a [`domain::Sale`].
#[derive(Clone, Debug, Serialize)]
pub struct Sale {
    /// Unique identifier.
    pub id: Uuid,

    /// ID of the sold lot.
    pub lot_id: Uuid,

    /// ID of the purchasing customer.
    pub customer_id: Uuid,

    /// Total price of the deal.
    pub total_price: String,

    /// Total of verified payments made towards the deal.
    pub total_verified_payments: String,

    /// Remaining balance due.
    pub balance_due: String,

    /// Percentage of the total price already paid.
    pub paid_percentage: String,

    /// Status of the deal.
    pub status: String,

    /// Timestamp of the deal.
    pub date: String,

    /// Creation timestamp.
    pub created_at: String,
}

impl From<domain::Sale> for Sale {
    fn from(sale: domain::Sale) -> Self {
        Self {
            id: sale.id.into(),
            lot_id: sale.lot_id.into(),
            customer_id: sale.customer_id.into(),
            total_price: sale.total_price.to_string(),
            total_verified_payments: sale
                .financials
                .total_verified_payments
                .to_string(),
            balance_due: sale.financials.balance_due.to_string(),
            paid_percentage: sale.financials.paid_percentage.to_string(),
            status: sale.status.to_string(),
            date: sale.date.to_rfc3339(),
            created_at: sale.created_at.to_rfc3339(),
        }
    }
}

/// Request of the `POST /sales` endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the lot being sold.
    pub lot_id: Uuid,

    /// ID of the purchasing customer.
    pub customer_id: Uuid,

    /// Timestamp of the deal ([RFC 3339]), defaulting to now.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub date: Option<String>,
}

/// Handles the `POST /sales` endpoint.
pub async fn create(
    Extension(service): Extension<Service>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Sale>, Error> {
    let cmd = command::CreateSale {
        lot_id: req.lot_id.into(),
        customer_id: req.customer_id.into(),
        date: req
            .date
            .map(|d| {
                domain::sale::DealDateTime::from_rfc3339(&d)
                    .map_err(|e| Error::bad_request(&e))
            })
            .transpose()?
            .unwrap_or_else(domain::sale::DealDateTime::now),
    };

    service
        .execute(cmd)
        .await
        .map(|sale| Json(sale.into()))
        .map_err(AsError::into_error)
}

/// Handles the `GET /sales/:id` endpoint.
pub async fn by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Sale>, Error> {
    service
        .execute(query::sale::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|sale| Json(sale.into()))
        .ok_or_else(|| Error::not_found(&format!("`Sale(id: {id})`")))
}

/// Request of the `PATCH /sales/:id` endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRequest {
    /// New lot to reassign the sale to.
    pub lot_id: Option<Uuid>,

    /// New price per square meter of the sold lot.
    pub price_per_m2: Option<String>,

    /// New timestamp of the deal ([RFC 3339]).
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub date: Option<String>,
}

/// Handles the `PATCH /sales/:id` endpoint.
pub async fn update(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Sale>, Error> {
    let cmd = command::UpdateSale {
        id: id.into(),
        lot_id: req.lot_id.map(Into::into),
        price_per_m2: req
            .price_per_m2
            .map(|p| p.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
        date: req
            .date
            .map(|d| {
                domain::sale::DealDateTime::from_rfc3339(&d)
                    .map_err(|e| Error::bad_request(&e))
            })
            .transpose()?,
    };

    service
        .execute(cmd)
        .await
        .map(|sale| Json(sale.into()))
        .map_err(AsError::into_error)
}

/// Handles the `DELETE /sales/:id` endpoint.
pub async fn delete(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Sale>, Error> {
    service
        .execute(command::DeleteSale { id: id.into() })
        .await
        .map(|sale| Json(sale.into()))
        .map_err(AsError::into_error)
}

/// Handles the `POST /sales/:id/cancel` endpoint.
pub async fn cancel(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Sale>, Error> {
    service
        .execute(command::CancelSale { id: id.into() })
        .await
        .map(|sale| Json(sale.into()))
        .map_err(AsError::into_error)
}

/// Handles the `POST /sales/:id/recompute` endpoint.
pub async fn recompute(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Sale>, Error> {
    service
        .execute(command::RecomputeSale { id: id.into() })
        .await
        .map(|sale| Json(sale.into()))
        .map_err(AsError::into_error)
}

/// Handles the `GET /customers/:id/sales` endpoint.
pub async fn by_customer(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Sale>>, Error> {
    service
        .execute(query::sales::ByCustomer::by(id.into()))
        .await
        .map(|sales| Json(sales.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}

/// Handles the `GET /lots/:id/sales` endpoint.
pub async fn by_lot(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Sale>>, Error> {
    service
        .execute(query::sales::ByLot::by(id.into()))
        .await
        .map(|sales| Json(sales.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}
