//! [`Payment`]-related JSON API.
//!
//! [`Payment`]: domain::Payment

use axum::{extract::Path, Extension, Json};
use serde::{Deserialize, Serialize};
use service::{command, domain, query, Command as _};
use uuid::Uuid;

use crate::{AsError, Error, Service};

/// JSON representation of a [`domain::Payment`].
#[derive(Clone, Debug, Serialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: Uuid,

    /// ID of the sale the payment is made towards.
    pub sale_id: Uuid,

    /// Paid amount.
    pub amount: String,

    /// Payment method.
    pub method: String,

    /// Verification status.
    pub status: String,

    /// Receipt reference, if attached.
    pub receipt: Option<String>,

    /// Timestamp of the payment operation.
    pub date: String,

    /// Creation timestamp.
    pub created_at: String,
}

impl From<domain::Payment> for Payment {
    fn from(payment: domain::Payment) -> Self {
        Self {
            id: payment.id.into(),
            sale_id: payment.sale_id.into(),
            amount: payment.amount.to_string(),
            method: payment.method.to_string(),
            status: payment.status.to_string(),
            receipt: payment.receipt.map(|r| r.to_string()),
            date: payment.date.to_rfc3339(),
            created_at: payment.created_at.to_rfc3339(),
        }
    }
}

/// Request of the `POST /payments` endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// ID of the sale the payment is made towards.
    pub sale_id: Uuid,

    /// Paid amount (with currency code, e.g. `40000MAD`).
    pub amount: String,

    /// Payment method.
    pub method: String,

    /// Receipt reference.
    pub receipt: Option<String>,

    /// Timestamp of the payment operation ([RFC 3339]), defaulting to now.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub date: Option<String>,
}

/// Handles the `POST /payments` endpoint.
pub async fn create(
    Extension(service): Extension<Service>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Payment>, Error> {
    let cmd = command::CreatePayment {
        sale_id: req.sale_id.into(),
        amount: req.amount.parse().map_err(|e| Error::bad_request(&e))?,
        method: req.method.parse().map_err(|e| Error::bad_request(&e))?,
        receipt: req
            .receipt
            .map(|r| r.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
        date: req
            .date
            .map(|d| {
                domain::payment::OperationDateTime::from_rfc3339(&d)
                    .map_err(|e| Error::bad_request(&e))
            })
            .transpose()?
            .unwrap_or_else(domain::payment::OperationDateTime::now),
    };

    service
        .execute(cmd)
        .await
        .map(|payment| Json(payment.into()))
        .map_err(AsError::into_error)
}

/// Request of the `PATCH /payments/:id` endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRequest {
    /// New paid amount.
    pub amount: Option<String>,

    /// New payment method.
    pub method: Option<String>,

    /// New receipt reference.
    pub receipt: Option<String>,

    /// Indicator whether the receipt reference should be detached.
    pub clear_receipt: bool,

    /// Explicit verification status override.
    pub status: Option<String>,

    /// New timestamp of the payment operation ([RFC 3339]).
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub date: Option<String>,
}

/// Handles the `PATCH /payments/:id` endpoint.
pub async fn update(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Payment>, Error> {
    let receipt = if req.clear_receipt {
        Some(None)
    } else {
        req.receipt
            .map(|r| r.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?
            .map(Some)
    };

    let cmd = command::UpdatePayment {
        id: id.into(),
        amount: req
            .amount
            .map(|a| a.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
        method: req
            .method
            .map(|m| m.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
        receipt,
        status: req
            .status
            .map(|s| s.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
        date: req
            .date
            .map(|d| {
                domain::payment::OperationDateTime::from_rfc3339(&d)
                    .map_err(|e| Error::bad_request(&e))
            })
            .transpose()?,
    };

    service
        .execute(cmd)
        .await
        .map(|payment| Json(payment.into()))
        .map_err(AsError::into_error)
}

/// Handles the `DELETE /payments/:id` endpoint.
pub async fn delete(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Payment>, Error> {
    service
        .execute(command::DeletePayment { id: id.into() })
        .await
        .map(|payment| Json(payment.into()))
        .map_err(AsError::into_error)
}

/// Handles the `GET /sales/:id/payments` endpoint.
pub async fn by_sale(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, Error> {
    service
        .execute(query::payments::BySale::by(id.into()))
        .await
        .map(|payments| Json(payments.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}
