//! [`Command`] for updating a [`Payment`].

use common::{
    operations::{
        By, Commit, Lock, Select, Transact, Transacted, Update,
    },
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{lot, payment, sale, Lot, Payment, Sale},
    infra::{database, Database},
    Service,
};

use super::{recompute_sale, Command};

/// [`Command`] for updating a [`Payment`].
///
/// Changing the receipt re-classifies the [`Payment`]; an explicit `status`
/// then overrides the classification (the only way a [`Payment`] becomes
/// [`payment::Status::Failed`]). The [`Sale`]'s financials are recomputed in
/// the same transaction.
#[derive(Clone, Debug)]
pub struct UpdatePayment {
    /// ID of the [`Payment`] to update.
    pub id: payment::Id,

    /// New amount of the [`Payment`], if changed.
    pub amount: Option<Money>,

    /// New [`payment::Method`] of the [`Payment`], if changed.
    pub method: Option<payment::Method>,

    /// New [`payment::Receipt`] of the [`Payment`], if changed (`Some(None)`
    /// withdraws the present one).
    pub receipt: Option<Option<payment::Receipt>>,

    /// Explicit [`payment::Status`] override, if any.
    pub status: Option<payment::Status>,

    /// New [`DateTime`] when the [`Payment`] was made, if changed.
    ///
    /// [`DateTime`]: common::DateTime
    pub date: Option<payment::OperationDateTime>,
}

impl<Db> Command<UpdatePayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Payment>, payment::Id>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Payment>, payment::Receipt>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Sale>, sale::Id>>,
            Ok = Option<Sale>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Payment>, sale::Id>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Lot>, lot::Id>>,
            Ok = Option<Lot>,
            Err = Traced<database::Error>,
        > + Database<Update<Payment>, Err = Traced<database::Error>>
        + Database<Update<Sale>, Err = Traced<database::Error>>
        + Database<Update<Lot>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Sale, sale::Id>>, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Lot, lot::Id>>, Err = Traced<database::Error>>,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(&self, cmd: UpdatePayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdatePayment {
            id,
            amount,
            method,
            receipt,
            status,
            date,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut payment = tx
            .execute(Select(By::<Option<Payment>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PaymentNotExists(id))
            .map_err(tracerr::wrap!())?;

        // Avoid concurrent actions upon the same `Sale`.
        tx.execute(Lock(By::<Sale, _>::new(payment.sale_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let sale = tx
            .execute(Select(By::<Option<Sale>, _>::new(payment.sale_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SaleNotExists(payment.sale_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Lock(By::<Lot, _>::new(sale.lot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if let Some(amount) = amount {
            if amount.currency != sale.total_price.currency {
                return Err(tracerr::new!(E::CurrencyMismatch {
                    sale: sale.total_price.currency,
                    provided: amount.currency,
                }));
            }
            payment.amount = amount;
        }
        if let Some(method) = method {
            payment.method = method;
        }
        if let Some(receipt) = receipt {
            if let Some(receipt) = &receipt {
                let existing = tx
                    .execute(Select(By::<Option<Payment>, _>::new(
                        receipt.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if existing.is_some_and(|p| p.id != payment.id) {
                    return Err(tracerr::new!(E::ReceiptAlreadyUsed(
                        receipt.clone(),
                    )));
                }
            }
            payment.receipt = receipt;
            payment.status =
                payment::Status::classify(payment.receipt.as_ref());
        }
        if let Some(status) = status {
            payment.status = status;
        }
        if let Some(date) = date {
            payment.date = date;
        }

        tx.execute(Update(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        recompute_sale::reconcile_in(&tx, sale)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(payment)
    }
}

/// Error of [`UpdatePayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided amount is denominated in a different currency than the
    /// [`Sale`].
    #[display(
        "provided amount currency `{provided}` differs from the `Sale` \
         currency `{sale}`"
    )]
    CurrencyMismatch {
        /// Currency of the [`Sale`].
        sale: common::money::Currency,

        /// Currency of the provided amount.
        provided: common::money::Currency,
    },

    /// [`Payment`] with the provided ID does not exist.
    #[display("`Payment(id: {_0})` does not exist")]
    PaymentNotExists(#[error(not(source))] payment::Id),

    /// [`payment::Receipt`] is used by another [`Payment`] already.
    #[display("`Receipt({_0})` is used by another `Payment` already")]
    ReceiptAlreadyUsed(#[error(not(source))] payment::Receipt),

    /// [`Sale`] with the provided ID does not exist.
    #[display("`Sale(id: {_0})` does not exist")]
    SaleNotExists(#[error(not(source))] sale::Id),
}
