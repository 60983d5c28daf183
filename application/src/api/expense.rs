//! [`Expense`]-related JSON API.
//!
//! [`Expense`]: domain::Expense

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use service::{command, domain, query, Command as _};
use uuid::Uuid;

use crate::{AsError, Error, Service};

/// JSON representation of a [`domain::Expense`].
#[derive(Clone, Debug, Serialize)]
pub struct Expense {
    /// Unique identifier.
    pub id: Uuid,

    /// Spent amount.
    pub amount: String,

    /// Beneficiary of the spending.
    pub beneficiary: String,

    /// Kind of the spending.
    pub kind: String,

    /// Receipt reference, if attached.
    pub receipt: Option<String>,

    /// Timestamp of the spending operation.
    pub date: String,

    /// Creation timestamp.
    pub created_at: String,
}

impl From<domain::Expense> for Expense {
    fn from(expense: domain::Expense) -> Self {
        Self {
            id: expense.id.into(),
            amount: expense.amount.to_string(),
            beneficiary: expense.beneficiary.to_string(),
            kind: expense.kind.to_string(),
            receipt: expense.receipt.map(|r| r.to_string()),
            date: expense.date.to_rfc3339(),
            created_at: expense.created_at.to_rfc3339(),
        }
    }
}

/// Request of the `POST /expenses` endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// Spent amount (with currency code, e.g. `1500MAD`).
    pub amount: String,

    /// Beneficiary of the spending.
    pub beneficiary: String,

    /// Kind of the spending.
    pub kind: String,

    /// Receipt reference.
    pub receipt: Option<String>,

    /// Timestamp of the spending operation ([RFC 3339]), defaulting to now.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub date: Option<String>,
}

/// Handles the `POST /expenses` endpoint.
pub async fn create(
    Extension(service): Extension<Service>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Expense>, Error> {
    let cmd = command::CreateExpense {
        amount: req.amount.parse().map_err(|e| Error::bad_request(&e))?,
        beneficiary: req
            .beneficiary
            .parse()
            .map_err(|e| Error::bad_request(&e))?,
        kind: req.kind.parse().map_err(|e| Error::bad_request(&e))?,
        receipt: req
            .receipt
            .map(|r| r.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
        date: req
            .date
            .map(|d| {
                domain::expense::OperationDateTime::from_rfc3339(&d)
                    .map_err(|e| Error::bad_request(&e))
            })
            .transpose()?
            .unwrap_or_else(domain::expense::OperationDateTime::now),
    };

    service
        .execute(cmd)
        .await
        .map(|expense| Json(expense.into()))
        .map_err(AsError::into_error)
}

/// Handles the `GET /expenses` endpoint.
pub async fn list(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Expense>>, Error> {
    service
        .execute(query::expenses::All::by(()))
        .await
        .map(|expenses| Json(expenses.into_iter().map(Into::into).collect()))
        .map_err(AsError::into_error)
}
