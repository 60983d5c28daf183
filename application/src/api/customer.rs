//! [`Customer`]-related JSON API.
//!
//! [`Customer`]: domain::Customer

use axum::{extract::Path, Extension, Json};
use serde::{Deserialize, Serialize};
use service::{command, domain, query, Command as _};
use uuid::Uuid;

use crate::{AsError, Error, Service};

/// JSON representation of a [`domain::Customer`].
#[derive(Clone, Debug, Serialize)]
pub struct Customer {
    /// Unique identifier.
    pub id: Uuid,

    /// Full name.
    pub name: String,

    /// Unique phone number.
    pub phone: String,

    /// Unique national identity card number.
    pub cin: String,

    /// Postal address, if known.
    pub address: Option<String>,

    /// Creation timestamp.
    pub created_at: String,
}

impl From<domain::Customer> for Customer {
    fn from(customer: domain::Customer) -> Self {
        Self {
            id: customer.id.into(),
            name: customer.name.to_string(),
            phone: customer.phone.to_string(),
            cin: customer.cin.to_string(),
            address: customer.address.map(|a| a.to_string()),
            created_at: customer.created_at.to_rfc3339(),
        }
    }
}

/// Request of the `POST /customers` endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateRequest {
    /// Full name.
    pub name: String,

    /// Unique phone number.
    pub phone: String,

    /// Unique national identity card number.
    pub cin: String,

    /// Postal address.
    pub address: Option<String>,
}

/// Handles the `POST /customers` endpoint.
pub async fn create(
    Extension(service): Extension<Service>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Customer>, Error> {
    let cmd = command::CreateCustomer {
        name: req.name.parse().map_err(|e| Error::bad_request(&e))?,
        phone: req.phone.parse().map_err(|e| Error::bad_request(&e))?,
        cin: req.cin.parse().map_err(|e| Error::bad_request(&e))?,
        address: req
            .address
            .map(|a| a.parse().map_err(|e| Error::bad_request(&e)))
            .transpose()?,
    };

    service
        .execute(cmd)
        .await
        .map(|customer| Json(customer.into()))
        .map_err(AsError::into_error)
}

/// Handles the `GET /customers/:id` endpoint.
pub async fn by_id(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, Error> {
    service
        .execute(query::customer::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|customer| Json(customer.into()))
        .ok_or_else(|| Error::not_found(&format!("`Customer(id: {id})`")))
}

/// Handles the `DELETE /customers/:id` endpoint.
pub async fn delete(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Customer>, Error> {
    service
        .execute(command::DeleteCustomer { id: id.into() })
        .await
        .map(|customer| Json(customer.into()))
        .map_err(AsError::into_error)
}
