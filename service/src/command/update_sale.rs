//! [`Command`] for updating a [`Sale`].

use common::{
    operations::{
        By, Commit, Lock, Perform, Select, Transact, Transacted, Update,
    },
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{lot, sale, Lot, Payment, Sale},
    infra::{database, Database},
    read::{self, Active},
    Service,
};

use super::{recompute_sale, Command};

/// [`Command`] for updating a [`Sale`].
///
/// Reassigning the [`Sale`] to another [`Lot`] re-validates the target
/// [`Lot`] as [`CreateSale`] does, and the previously referenced [`Lot`] is
/// released by the orphan sweep. Re-pricing writes the new price per square
/// meter onto the [`Lot`] and recalculates the [`Sale`]'s total price.
///
/// A canceled [`Sale`] cannot be updated, as cancellation is terminal.
///
/// [`CreateSale`]: super::CreateSale
#[derive(Clone, Copy, Debug)]
pub struct UpdateSale {
    /// ID of the [`Sale`] to update.
    pub id: sale::Id,

    /// New [`Lot`] for the [`Sale`] to reference, if reassigned.
    pub lot_id: Option<lot::Id>,

    /// New price per square meter of the [`Lot`], if re-priced.
    pub price_per_m2: Option<Money>,

    /// New [`DateTime`] of the deal, if changed.
    ///
    /// [`DateTime`]: common::DateTime
    pub date: Option<sale::DealDateTime>,
}

impl<Db> Command<UpdateSale> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Sale>, sale::Id>>,
            Ok = Option<Sale>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Lot>, lot::Id>>,
            Ok = Option<Lot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Sale>>, lot::Id>>,
            Ok = Option<Active<Sale>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Payment>, sale::Id>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        > + Database<
            Perform<read::lot::ReleaseOrphaned>,
            Ok = Vec<lot::Id>,
            Err = Traced<database::Error>,
        > + Database<Update<Sale>, Err = Traced<database::Error>>
        + Database<Update<Lot>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Sale, sale::Id>>, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Lot, lot::Id>>, Err = Traced<database::Error>>,
{
    type Ok = Sale;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(&self, cmd: UpdateSale) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateSale {
            id,
            lot_id,
            price_per_m2,
            date,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Sale`.
        tx.execute(Lock(By::<Sale, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut sale = tx
            .execute(Select(By::<Option<Sale>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SaleNotExists(id))
            .map_err(tracerr::wrap!())?;
        if sale.status == sale::Status::Canceled {
            return Err(tracerr::new!(E::SaleAlreadyCanceled(id)));
        }

        let reassigned_to = lot_id.filter(|l| *l != sale.lot_id);
        if let Some(lot_id) = reassigned_to {
            tx.execute(Lock(By::<Lot, _>::new(lot_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            let lot = tx
                .execute(Select(By::<Option<Lot>, _>::new(lot_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::LotNotExists(lot_id))
                .map_err(tracerr::wrap!())?;
            if lot.status != lot::Status::Available {
                return Err(tracerr::new!(E::LotNotAvailable(lot_id)));
            }

            let active_sale = tx
                .execute(Select(By::<Option<Active<Sale>>, _>::new(lot_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if active_sale.is_some() {
                return Err(tracerr::new!(E::LotNotAvailable(lot_id)));
            }

            sale.lot_id = lot.id;
        } else {
            tx.execute(Lock(By::<Lot, _>::new(sale.lot_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        if let Some(price) = price_per_m2 {
            if price.currency != sale.total_price.currency {
                return Err(tracerr::new!(E::CurrencyMismatch {
                    sale: sale.total_price.currency,
                    provided: price.currency,
                }));
            }

            let mut lot = tx
                .execute(Select(By::<Option<Lot>, _>::new(sale.lot_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::LotNotExists(sale.lot_id))
                .map_err(tracerr::wrap!())?;
            lot.price_per_m2 = price;
            sale.total_price = lot.total_price();
            tx.execute(Update(lot))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        if let Some(date) = date {
            sale.date = date;
        }

        let sale = recompute_sale::reconcile_in(&tx, sale)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Repairs a `Lot` stranded by the reassignment.
        tx.execute(Perform(read::lot::ReleaseOrphaned))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(sale)
    }
}

/// Error of [`UpdateSale`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided price is denominated in a different currency than the
    /// [`Sale`].
    #[display(
        "provided price currency `{provided}` differs from the `Sale` \
         currency `{sale}`"
    )]
    CurrencyMismatch {
        /// Currency of the [`Sale`].
        sale: common::money::Currency,

        /// Currency of the provided price.
        provided: common::money::Currency,
    },

    /// [`Lot`] with the provided ID is not available for sale.
    #[display("`Lot(id: {_0})` is not available for sale")]
    LotNotAvailable(#[error(not(source))] lot::Id),

    /// [`Lot`] with the provided ID does not exist.
    #[display("`Lot(id: {_0})` does not exist")]
    LotNotExists(#[error(not(source))] lot::Id),

    /// [`Sale`] with the provided ID is canceled.
    #[display("`Sale(id: {_0})` is canceled")]
    SaleAlreadyCanceled(#[error(not(source))] sale::Id),

    /// [`Sale`] with the provided ID does not exist.
    #[display("`Sale(id: {_0})` does not exist")]
    SaleNotExists(#[error(not(source))] sale::Id),
}
