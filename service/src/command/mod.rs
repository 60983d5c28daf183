//! [`Command`] definition.

pub mod cancel_sale;
pub mod create_customer;
pub mod create_expense;
pub mod create_lot;
pub mod create_payment;
pub mod create_sale;
pub mod delete_customer;
pub mod delete_lot;
pub mod delete_payment;
pub mod delete_sale;
pub mod reconcile_orphans;
pub mod recompute_sale;
pub mod update_payment;
pub mod update_sale;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_sale::CancelSale, create_customer::CreateCustomer,
    create_expense::CreateExpense, create_lot::CreateLot,
    create_payment::CreatePayment, create_sale::CreateSale,
    delete_customer::DeleteCustomer, delete_lot::DeleteLot,
    delete_payment::DeletePayment, delete_sale::DeleteSale,
    reconcile_orphans::ReconcileOrphans, recompute_sale::RecomputeSale,
    update_payment::UpdatePayment, update_sale::UpdateSale,
};
