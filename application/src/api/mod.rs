//! JSON API definitions.

pub mod customer;
pub mod expense;
pub mod lot;
pub mod payment;
pub mod report;
pub mod sale;

use axum::{
    routing::{get, patch, post},
    Extension, Router,
};

use crate::Service;

/// Builds a [`Router`] exposing the JSON API of the provided [`Service`].
///
/// Routes map 1:1 onto the [`Service`]'s commands and queries.
pub fn router(service: Service) -> Router {
    Router::new()
        .route("/lots", post(lot::create).get(lot::list))
        .route("/lots/reconcile", post(lot::reconcile_orphans))
        .route("/lots/:id", get(lot::by_id).delete(lot::delete))
        .route("/lots/:id/sales", get(sale::by_lot))
        .route("/customers", post(customer::create))
        .route(
            "/customers/:id",
            get(customer::by_id).delete(customer::delete),
        )
        .route("/customers/:id/sales", get(sale::by_customer))
        .route("/sales", post(sale::create))
        .route(
            "/sales/:id",
            get(sale::by_id).patch(sale::update).delete(sale::delete),
        )
        .route("/sales/:id/cancel", post(sale::cancel))
        .route("/sales/:id/recompute", post(sale::recompute))
        .route("/sales/:id/payments", get(payment::by_sale))
        .route("/payments", post(payment::create))
        .route(
            "/payments/:id",
            patch(payment::update).delete(payment::delete),
        )
        .route("/expenses", post(expense::create).get(expense::list))
        .route("/reports/dashboard", get(report::dashboard))
        .layer(Extension(service))
}
