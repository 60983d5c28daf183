//! [`Command`] for recomputing the financials of a [`Sale`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{lot, sale, Lot, Payment, Sale},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recomputing the financials of a [`Sale`] from the
/// [`Payment`]s referencing it, and applying the resulting status to its
/// [`Lot`].
///
/// Idempotent: recomputing an already consistent [`Sale`] changes nothing.
#[derive(Clone, Copy, Debug)]
pub struct RecomputeSale {
    /// ID of the [`Sale`] to recompute.
    pub id: sale::Id,
}

impl<Db> Command<RecomputeSale> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
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

    async fn execute(&self, cmd: RecomputeSale) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecomputeSale { id } = cmd;

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

        let sale = tx
            .execute(Select(By::<Option<Sale>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SaleNotExists(id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Lock(By::<Lot, _>::new(sale.lot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let sale = reconcile_in(&tx, sale)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(sale)
    }
}

/// Reconciles the provided [`Sale`] with the [`Payment`]s referencing it and
/// applies the resulting [`sale::Status`] to its [`Lot`], all within the
/// provided transaction.
///
/// The caller is expected to hold a [`Lock`] on the [`Sale`] row already.
pub(crate) async fn reconcile_in<Tx>(
    tx: &Tx,
    mut sale: Sale,
) -> Result<Sale, Traced<database::Error>>
where
    Tx: Database<
            Select<By<Vec<Payment>, sale::Id>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Lot>, lot::Id>>,
            Ok = Option<Lot>,
            Err = Traced<database::Error>,
        > + Database<Update<Sale>, Err = Traced<database::Error>>
        + Database<Update<Lot>, Err = Traced<database::Error>>,
{
    let payments = tx
        .execute(Select(By::<Vec<Payment>, _>::new(sale.id)))
        .await
        .map_err(tracerr::wrap!())?;

    sale.reconcile(&payments);
    tx.execute(Update(sale.clone()))
        .await
        .map_err(tracerr::wrap!())
        .map(drop)?;

    let lot = tx
        .execute(Select(By::<Option<Lot>, _>::new(sale.lot_id)))
        .await
        .map_err(tracerr::wrap!())?;
    if let Some(mut lot) = lot {
        lot.status = sale.status.into();
        tx.execute(Update(lot))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
    }

    Ok(sale)
}

/// Error of [`RecomputeSale`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Sale`] with the provided ID does not exist.
    #[display("`Sale(id: {_0})` does not exist")]
    SaleNotExists(#[error(not(source))] sale::Id),
}
