//! [`Command`] for creating a new [`Payment`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{lot, payment, sale, Lot, Payment, Sale},
    infra::{database, Database},
    Service,
};

use super::{recompute_sale, Command};

/// [`Command`] for creating a new [`Payment`] towards a [`Sale`].
///
/// The new [`Payment`] is classified by its receipt presence, and the
/// [`Sale`]'s financials are recomputed in the same transaction.
#[derive(Clone, Debug)]
pub struct CreatePayment {
    /// ID of the [`Sale`] the [`Payment`] is made towards.
    pub sale_id: sale::Id,

    /// Amount of the new [`Payment`].
    pub amount: Money,

    /// [`payment::Method`] the new [`Payment`] is made with.
    pub method: payment::Method,

    /// [`payment::Receipt`] evidencing the new [`Payment`], if presented.
    pub receipt: Option<payment::Receipt>,

    /// [`DateTime`] when the new [`Payment`] was made.
    pub date: payment::OperationDateTime,
}

impl<Db> Command<CreatePayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Sale>, sale::Id>>,
            Ok = Option<Sale>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Payment>, payment::Receipt>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Payment>, sale::Id>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Lot>, lot::Id>>,
            Ok = Option<Lot>,
            Err = Traced<database::Error>,
        > + Database<Insert<Payment>, Err = Traced<database::Error>>
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

    async fn execute(&self, cmd: CreatePayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePayment {
            sale_id,
            amount,
            method,
            receipt,
            date,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Sale`.
        tx.execute(Lock(By::<Sale, _>::new(sale_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let sale = tx
            .execute(Select(By::<Option<Sale>, _>::new(sale_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SaleNotExists(sale_id))
            .map_err(tracerr::wrap!())?;
        if amount.currency != sale.total_price.currency {
            return Err(tracerr::new!(E::CurrencyMismatch {
                sale: sale.total_price.currency,
                provided: amount.currency,
            }));
        }

        if let Some(receipt) = &receipt {
            let existing = tx
                .execute(Select(By::<Option<Payment>, _>::new(receipt.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if existing.is_some() {
                return Err(tracerr::new!(E::ReceiptAlreadyUsed(
                    receipt.clone(),
                )));
            }
        }

        tx.execute(Lock(By::<Lot, _>::new(sale.lot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let payment = Payment {
            id: payment::Id::new(),
            sale_id: sale.id,
            amount,
            method,
            status: payment::Status::classify(receipt.as_ref()),
            receipt,
            date,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(payment.clone()))
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

/// Error of [`CreatePayment`] [`Command`] execution.
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

    /// [`payment::Receipt`] is used by another [`Payment`] already.
    #[display("`Receipt({_0})` is used by another `Payment` already")]
    ReceiptAlreadyUsed(#[error(not(source))] payment::Receipt),

    /// [`Sale`] with the provided ID does not exist.
    #[display("`Sale(id: {_0})` does not exist")]
    SaleNotExists(#[error(not(source))] sale::Id),
}
