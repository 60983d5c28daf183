//! Domain definitions.

pub mod customer;
pub mod expense;
pub mod lot;
pub mod payment;
pub mod sale;

pub use self::{
    customer::Customer, expense::Expense, lot::Lot, payment::Payment,
    sale::Sale,
};
