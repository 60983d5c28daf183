//! Reporting JSON API.

use axum::{Extension, Json};
use serde::Serialize;
use service::{query, Command as _};

use crate::{api, AsError, Error, Service};

/// Response of the `GET /reports/dashboard` endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    /// Total count of sales.
    pub total_sales: i32,

    /// Per-currency money flow rows.
    pub totals: Vec<Row>,

    /// Per-currency totals of verified payments grouped by year.
    pub verified_by_year: Vec<YearlyTotal>,

    /// In-progress sales with the lowest paid percentage.
    pub least_funded: Vec<api::sale::Sale>,
}

/// Per-currency money flow row of a [`Dashboard`].
#[derive(Clone, Debug, Serialize)]
pub struct Row {
    /// Currency of this row.
    pub currency: String,

    /// Total of verified payments in the currency.
    pub verified_payments: String,

    /// Total of expenses in the currency.
    pub expenses: String,

    /// Net amount: verified payments minus expenses.
    pub net: String,
}

/// Per-currency total of verified payments within one year.
#[derive(Clone, Debug, Serialize)]
pub struct YearlyTotal {
    /// Year the total is calculated for.
    pub year: i32,

    /// Total of verified payments in the year.
    pub total: String,
}

/// Handles the `GET /reports/dashboard` endpoint.
pub async fn dashboard(
    Extension(service): Extension<Service>,
) -> Result<Json<Dashboard>, Error> {
    let out = service
        .execute(query::report::Dashboard)
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Dashboard {
        total_sales: out.total_sales.into(),
        totals: out
            .totals
            .into_iter()
            .map(|row| Row {
                currency: row.currency.to_string(),
                verified_payments: row.verified_payments.to_string(),
                expenses: row.expenses.to_string(),
                net: row.net.to_string(),
            })
            .collect(),
        verified_by_year: out
            .verified_by_year
            .into_iter()
            .map(|total| YearlyTotal {
                year: total.year,
                total: total.total.to_string(),
            })
            .collect(),
        least_funded: out.least_funded.into_iter().map(Into::into).collect(),
    }))
}
