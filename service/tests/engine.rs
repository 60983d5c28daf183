//! End-to-end tests of the reconciliation commands, driven through an
//! in-memory [`Database`] mock.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use common::{
    money::Currency,
    operations::{By, Commit, Delete, Insert, Lock, Perform, Select, Transact, Update},
    Money, Percent,
};
use futures::executor::block_on;
use rust_decimal::Decimal;
use service::{
    command,
    domain::{customer, expense, lot, payment, sale, Customer, Expense, Lot, Payment, Sale},
    infra::{database, Database},
    read::{self, Active},
    Command as _, Service,
};
use tracerr::Traced;

/// In-memory [`Database`] backing the [`Service`] under test.
#[derive(Clone, Debug, Default)]
struct Mock(Arc<Mutex<State>>);

#[derive(Debug, Default)]
struct State {
    lots: HashMap<lot::Id, Lot>,
    customers: HashMap<customer::Id, Customer>,
    sales: HashMap<sale::Id, Sale>,
    payments: HashMap<payment::Id, Payment>,
    expenses: HashMap<expense::Id, Expense>,
}

impl Mock {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }
}

type Err = Traced<database::Error>;

impl Database<Transact> for Mock {
    type Ok = Mock;
    type Err = Err;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Lot, lot::Id>>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        _: Lock<By<Lot, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Sale, sale::Id>>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        _: Lock<By<Sale, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Lot>, lot::Id>>> for Mock {
    type Ok = Option<Lot>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Lot>, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().lots.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Option<Lot>, lot::Reference>>> for Mock {
    type Ok = Option<Lot>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Lot>, lot::Reference>>,
    ) -> Result<Self::Ok, Self::Err> {
        let reference = by.into_inner();
        Ok(self
            .state()
            .lots
            .values()
            .find(|l| l.reference == reference)
            .cloned())
    }
}

impl Database<Insert<Lot>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Insert(lot): Insert<Lot>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().lots.insert(lot.id, lot));
        Ok(())
    }
}

impl Database<Update<Lot>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Update(lot): Update<Lot>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().lots.insert(lot.id, lot));
        Ok(())
    }
}

impl Database<Delete<By<Lot, lot::Id>>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Delete(by): Delete<By<Lot, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().lots.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Perform<read::lot::ReleaseOrphaned>> for Mock {
    type Ok = Vec<lot::Id>;
    type Err = Err;

    async fn execute(
        &self,
        Perform(_): Perform<read::lot::ReleaseOrphaned>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        let orphaned = state
            .lots
            .values()
            .filter(|l| {
                l.status != lot::Status::Available
                    && !state.sales.values().any(|s| s.lot_id == l.id)
            })
            .map(|l| l.id)
            .collect::<Vec<_>>();
        for id in &orphaned {
            state
                .lots
                .get_mut(id)
                .expect("listed just above")
                .status = lot::Status::Available;
        }
        Ok(orphaned)
    }
}

impl Database<Select<By<Option<Customer>, customer::Id>>> for Mock {
    type Ok = Option<Customer>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().customers.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Option<Customer>, customer::Phone>>> for Mock {
    type Ok = Option<Customer>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, customer::Phone>>,
    ) -> Result<Self::Ok, Self::Err> {
        let phone = by.into_inner();
        Ok(self
            .state()
            .customers
            .values()
            .find(|c| c.phone == phone)
            .cloned())
    }
}

impl Database<Select<By<Option<Customer>, customer::Cin>>> for Mock {
    type Ok = Option<Customer>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, customer::Cin>>,
    ) -> Result<Self::Ok, Self::Err> {
        let cin = by.into_inner();
        Ok(self
            .state()
            .customers
            .values()
            .find(|c| c.cin == cin)
            .cloned())
    }
}

impl Database<Insert<Customer>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Insert(customer): Insert<Customer>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().customers.insert(customer.id, customer));
        Ok(())
    }
}

impl Database<Delete<By<Customer, customer::Id>>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Delete(by): Delete<By<Customer, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().customers.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Select<By<Option<Sale>, sale::Id>>> for Mock {
    type Ok = Option<Sale>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Sale>, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().sales.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Option<Active<Sale>>, lot::Id>>> for Mock {
    type Ok = Option<Active<Sale>>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Sale>>, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let lot_id = by.into_inner();
        Ok(self
            .state()
            .sales
            .values()
            .find(|s| s.lot_id == lot_id && s.is_active())
            .cloned()
            .map(Active))
    }
}

impl Database<Select<By<Vec<Sale>, customer::Id>>> for Mock {
    type Ok = Vec<Sale>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let customer_id = by.into_inner();
        Ok(self
            .state()
            .sales
            .values()
            .filter(|s| s.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Vec<Sale>, lot::Id>>> for Mock {
    type Ok = Vec<Sale>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let lot_id = by.into_inner();
        Ok(self
            .state()
            .sales
            .values()
            .filter(|s| s.lot_id == lot_id)
            .cloned()
            .collect())
    }
}

impl Database<Insert<Sale>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().sales.insert(sale.id, sale));
        Ok(())
    }
}

impl Database<Update<Sale>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Update(sale): Update<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().sales.insert(sale.id, sale));
        Ok(())
    }
}

impl Database<Delete<By<Sale, sale::Id>>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Delete(by): Delete<By<Sale, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().sales.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Select<By<Option<Payment>, payment::Id>>> for Mock {
    type Ok = Option<Payment>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().payments.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Option<Payment>, payment::Receipt>>> for Mock {
    type Ok = Option<Payment>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Receipt>>,
    ) -> Result<Self::Ok, Self::Err> {
        let receipt = by.into_inner();
        Ok(self
            .state()
            .payments
            .values()
            .find(|p| p.receipt.as_ref() == Some(&receipt))
            .cloned())
    }
}

impl Database<Select<By<Vec<Payment>, sale::Id>>> for Mock {
    type Ok = Vec<Payment>;
    type Err = Err;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sale_id = by.into_inner();
        let mut payments = self
            .state()
            .payments
            .values()
            .filter(|p| p.sale_id == sale_id)
            .cloned()
            .collect::<Vec<_>>();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }
}

impl Database<Insert<Payment>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().payments.insert(payment.id, payment));
        Ok(())
    }
}

impl Database<Update<Payment>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().payments.insert(payment.id, payment));
        Ok(())
    }
}

impl Database<Delete<By<Payment, payment::Id>>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Delete(by): Delete<By<Payment, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().payments.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Delete<By<Vec<Payment>, sale::Id>>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Payment>, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sale_id = by.into_inner();
        self.state().payments.retain(|_, p| p.sale_id != sale_id);
        Ok(())
    }
}

impl Database<Insert<Expense>> for Mock {
    type Ok = ();
    type Err = Err;

    async fn execute(
        &self,
        Insert(expense): Insert<Expense>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().expenses.insert(expense.id, expense));
        Ok(())
    }
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn mad(amount: &str) -> Money {
    Money {
        amount: dec(amount),
        currency: Currency::Mad,
    }
}

fn service() -> (Service<Mock>, Mock) {
    let mock = Mock::default();
    (Service::new(mock.clone()), mock)
}

/// Creates a 500 m² `Lot` priced at 200 MAD/m² (100000 MAD total).
fn create_lot(service: &Service<Mock>, reference: &str) -> Lot {
    block_on(service.execute(command::CreateLot {
        reference: reference.parse().unwrap(),
        size: "500".parse().unwrap(),
        price_per_m2: mad("200"),
        zoning_code: "R2".parse().unwrap(),
        description: None,
    }))
    .unwrap()
}

fn create_customer(service: &Service<Mock>, phone: &str, cin: &str) -> Customer {
    block_on(service.execute(command::CreateCustomer {
        name: "Amina El Fassi".parse().unwrap(),
        phone: phone.parse().unwrap(),
        cin: cin.parse().unwrap(),
        address: None,
    }))
    .unwrap()
}

fn create_sale(service: &Service<Mock>, lot: &Lot, customer: &Customer) -> Sale {
    block_on(service.execute(command::CreateSale {
        lot_id: lot.id,
        customer_id: customer.id,
        date: sale::DealDateTime::now(),
    }))
    .unwrap()
}

fn pay(
    service: &Service<Mock>,
    sale: &Sale,
    amount: &str,
    receipt: Option<&str>,
) -> Payment {
    block_on(service.execute(command::CreatePayment {
        sale_id: sale.id,
        amount: mad(amount),
        method: payment::Method::BankTransfer,
        receipt: receipt.map(|r| r.parse().unwrap()),
        date: payment::OperationDateTime::now(),
    }))
    .unwrap()
}

fn lot_status(mock: &Mock, id: lot::Id) -> lot::Status {
    mock.state().lots[&id].status
}

fn sale_in(mock: &Mock, id: sale::Id) -> Sale {
    mock.state().sales[&id].clone()
}

#[test]
fn full_payment_lifecycle_round_trips() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");

    let sale = create_sale(&service, &lot, &customer);
    assert_eq!(sale.total_price, mad("100000"));
    assert_eq!(sale.status, sale::Status::Initiated);
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Reserved);

    _ = pay(&service, &sale, "40000", Some("RCPT-1"));
    let sale = sale_in(&mock, sale.id);
    assert_eq!(sale.status, sale::Status::Ongoing);
    assert_eq!(sale.financials.total_verified_payments, mad("40000"));
    assert_eq!(sale.financials.balance_due, mad("60000"));
    assert_eq!(
        sale.financials.paid_percentage,
        Percent::new(dec("40")).unwrap(),
    );
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Ongoing);

    _ = pay(&service, &sale, "60000", Some("RCPT-2"));
    let sale = sale_in(&mock, sale.id);
    assert_eq!(sale.status, sale::Status::Completed);
    assert_eq!(sale.financials.balance_due, mad("0"));
    assert_eq!(sale.financials.paid_percentage, Percent::HUNDRED);
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Sold);
}

#[test]
fn recomputation_is_idempotent() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);
    _ = pay(&service, &sale, "25000", Some("RCPT-1"));

    let once =
        block_on(service.execute(command::RecomputeSale { id: sale.id }))
            .unwrap();
    let twice =
        block_on(service.execute(command::RecomputeSale { id: sale.id }))
            .unwrap();

    assert_eq!(once.financials, twice.financials);
    assert_eq!(once.status, twice.status);
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Ongoing);
}

#[test]
fn lot_admits_single_active_sale() {
    let (service, _) = service();
    let lot = create_lot(&service, "LOT-A1");
    let first = create_customer(&service, "0612345678", "AB123456");
    let second = create_customer(&service, "0698765432", "CD654321");
    _ = create_sale(&service, &lot, &first);

    let err = block_on(service.execute(command::CreateSale {
        lot_id: lot.id,
        customer_id: second.id,
        date: sale::DealDateTime::now(),
    }))
    .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        command::create_sale::ExecutionError::LotNotAvailable(_),
    ));
}

#[test]
fn unverified_payments_do_not_contribute() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);

    let payment = pay(&service, &sale, "40000", None);
    assert_eq!(payment.status, payment::Status::Pending);

    let sale = sale_in(&mock, sale.id);
    assert_eq!(sale.status, sale::Status::Initiated);
    assert_eq!(sale.financials.total_verified_payments, mad("0"));
    assert_eq!(sale.financials.balance_due, mad("100000"));
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Reserved);
}

#[test]
fn overpayment_floors_balance_and_caps_percentage() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);

    _ = pay(&service, &sale, "150000", Some("RCPT-1"));

    let sale = sale_in(&mock, sale.id);
    assert_eq!(sale.status, sale::Status::Completed);
    assert_eq!(sale.financials.balance_due, mad("0"));
    assert_eq!(sale.financials.paid_percentage, Percent::HUNDRED);
}

#[test]
fn duplicate_receipt_is_rejected() {
    let (service, _) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);
    _ = pay(&service, &sale, "10000", Some("RCPT-1"));

    let err = block_on(service.execute(command::CreatePayment {
        sale_id: sale.id,
        amount: mad("10000"),
        method: payment::Method::Cheque,
        receipt: Some("RCPT-1".parse().unwrap()),
        date: payment::OperationDateTime::now(),
    }))
    .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        command::create_payment::ExecutionError::ReceiptAlreadyUsed(_),
    ));
}

#[test]
fn explicit_failure_excludes_contribution() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);
    let payment = pay(&service, &sale, "40000", Some("RCPT-1"));
    assert_eq!(payment.status, payment::Status::Verified);

    let failed = block_on(service.execute(command::UpdatePayment {
        id: payment.id,
        amount: None,
        method: None,
        receipt: None,
        status: Some(payment::Status::Failed),
        date: None,
    }))
    .unwrap();
    assert_eq!(failed.status, payment::Status::Failed);

    let sale = sale_in(&mock, sale.id);
    assert_eq!(sale.financials.total_verified_payments, mad("0"));
    assert_eq!(sale.status, sale::Status::Initiated);
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Reserved);
}

#[test]
fn deleting_payment_rolls_financials_back() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);
    let payment = pay(&service, &sale, "40000", Some("RCPT-1"));

    _ = block_on(service.execute(command::DeletePayment { id: payment.id }))
        .unwrap();

    let sale = sale_in(&mock, sale.id);
    assert_eq!(sale.financials.total_verified_payments, mad("0"));
    assert_eq!(sale.financials.balance_due, mad("100000"));
    assert_eq!(sale.status, sale::Status::Initiated);
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Reserved);
}

#[test]
fn cancellation_survives_recomputation() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);
    _ = pay(&service, &sale, "40000", Some("RCPT-1"));

    let canceled =
        block_on(service.execute(command::CancelSale { id: sale.id }))
            .unwrap();
    assert_eq!(canceled.status, sale::Status::Canceled);
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Canceled);

    let recomputed =
        block_on(service.execute(command::RecomputeSale { id: sale.id }))
            .unwrap();
    assert_eq!(recomputed.status, sale::Status::Canceled);
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Canceled);
}

#[test]
fn canceling_twice_is_rejected() {
    let (service, _) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);

    _ = block_on(service.execute(command::CancelSale { id: sale.id }))
        .unwrap();
    let err = block_on(service.execute(command::CancelSale { id: sale.id }))
        .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        command::cancel_sale::ExecutionError::SaleAlreadyCanceled(_),
    ));
}

#[test]
fn reassigning_sale_releases_previous_lot() {
    let (service, mock) = service();
    let first = create_lot(&service, "LOT-A1");
    let second = create_lot(&service, "LOT-B2");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &first, &customer);
    _ = pay(&service, &sale, "40000", Some("RCPT-1"));

    let updated = block_on(service.execute(command::UpdateSale {
        id: sale.id,
        lot_id: Some(second.id),
        price_per_m2: None,
        date: None,
    }))
    .unwrap();

    assert_eq!(updated.lot_id, second.id);
    assert_eq!(updated.status, sale::Status::Ongoing);
    assert_eq!(lot_status(&mock, first.id), lot::Status::Available);
    assert_eq!(lot_status(&mock, second.id), lot::Status::Ongoing);
}

#[test]
fn reassignment_revalidates_target_lot() {
    let (service, _) = service();
    let first = create_lot(&service, "LOT-A1");
    let second = create_lot(&service, "LOT-B2");
    let owner = create_customer(&service, "0612345678", "AB123456");
    let other = create_customer(&service, "0698765432", "CD654321");
    let sale = create_sale(&service, &first, &owner);
    _ = create_sale(&service, &second, &other);

    let err = block_on(service.execute(command::UpdateSale {
        id: sale.id,
        lot_id: Some(second.id),
        price_per_m2: None,
        date: None,
    }))
    .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        command::update_sale::ExecutionError::LotNotAvailable(_),
    ));
}

#[test]
fn repricing_reopens_completed_sale() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);
    _ = pay(&service, &sale, "100000", Some("RCPT-1"));
    assert_eq!(sale_in(&mock, sale.id).status, sale::Status::Completed);

    let updated = block_on(service.execute(command::UpdateSale {
        id: sale.id,
        lot_id: None,
        price_per_m2: Some(mad("250")),
        date: None,
    }))
    .unwrap();

    assert_eq!(updated.total_price, mad("125000"));
    assert_eq!(updated.status, sale::Status::Ongoing);
    assert_eq!(updated.financials.total_verified_payments, mad("100000"));
    assert_eq!(updated.financials.balance_due, mad("25000"));
    assert_eq!(
        updated.financials.paid_percentage,
        Percent::new(dec("80")).unwrap(),
    );
    assert_eq!(mock.state().lots[&lot.id].price_per_m2, mad("250"));
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Ongoing);
}

#[test]
fn updating_canceled_sale_is_rejected() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);
    _ = block_on(service.execute(command::CancelSale { id: sale.id }))
        .unwrap();

    let err = block_on(service.execute(command::UpdateSale {
        id: sale.id,
        lot_id: None,
        price_per_m2: None,
        date: Some(sale::DealDateTime::now()),
    }))
    .unwrap_err();

    assert!(matches!(
        err.as_ref(),
        command::update_sale::ExecutionError::SaleAlreadyCanceled(_),
    ));
    assert_eq!(lot_status(&mock, lot.id), lot::Status::Canceled);
}

#[test]
fn deleting_sale_releases_its_lot() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);
    _ = pay(&service, &sale, "40000", Some("RCPT-1"));

    _ = block_on(service.execute(command::DeleteSale { id: sale.id }))
        .unwrap();

    let state = mock.state();
    assert!(state.sales.is_empty());
    assert!(state.payments.is_empty());
    assert_eq!(state.lots[&lot.id].status, lot::Status::Available);
}

#[test]
fn deleting_customer_cascades_and_releases() {
    let (service, mock) = service();
    let lot = create_lot(&service, "LOT-A1");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &lot, &customer);
    _ = pay(&service, &sale, "40000", Some("RCPT-1"));

    _ = block_on(
        service.execute(command::DeleteCustomer { id: customer.id }),
    )
    .unwrap();

    let state = mock.state();
    assert!(state.customers.is_empty());
    assert!(state.sales.is_empty());
    assert!(state.payments.is_empty());
    assert_eq!(state.lots[&lot.id].status, lot::Status::Available);
}

#[test]
fn orphan_sweep_only_touches_saleless_lots() {
    let (service, mock) = service();
    let orphaned = create_lot(&service, "LOT-A1");
    let sold = create_lot(&service, "LOT-B2");
    let customer = create_customer(&service, "0612345678", "AB123456");
    let sale = create_sale(&service, &sold, &customer);

    // Orphan the first `Lot` behind the engine's back.
    mock.state()
        .lots
        .get_mut(&orphaned.id)
        .unwrap()
        .status = lot::Status::Reserved;

    let released =
        block_on(service.execute(command::ReconcileOrphans)).unwrap();

    assert_eq!(released, vec![orphaned.id]);
    assert_eq!(lot_status(&mock, orphaned.id), lot::Status::Available);
    assert_eq!(lot_status(&mock, sold.id), lot::Status::Reserved);
    assert!(mock.state().sales.contains_key(&sale.id));
}

#[test]
fn expense_is_recorded() {
    let (service, mock) = service();

    let expense = block_on(service.execute(command::CreateExpense {
        amount: mad("1500"),
        beneficiary: "Bureau d'études".parse().unwrap(),
        kind: expense::Kind::Permits,
        receipt: None,
        date: expense::OperationDateTime::now(),
    }))
    .unwrap();

    assert!(mock.state().expenses.contains_key(&expense.id));
}
