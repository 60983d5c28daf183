//! [`Command`] for canceling a [`Sale`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{lot, sale, Lot, Sale},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for canceling a [`Sale`].
///
/// Cancellation is a terminal administrative override: the [`Sale`] keeps
/// its financials but stops deriving its status, and its [`Lot`] is marked
/// [`lot::Status::Canceled`] until the orphan sweep releases it.
#[derive(Clone, Copy, Debug)]
pub struct CancelSale {
    /// ID of the [`Sale`] to cancel.
    pub id: sale::Id,
}

impl<Db> Command<CancelSale> for Service<Db>
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

    async fn execute(&self, cmd: CancelSale) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelSale { id } = cmd;

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

        sale.status = sale::Status::Canceled;
        tx.execute(Update(sale.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Lock(By::<Lot, _>::new(sale.lot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let lot = tx
            .execute(Select(By::<Option<Lot>, _>::new(sale.lot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(mut lot) = lot {
            lot.status = sale.status.into();
            tx.execute(Update(lot))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(sale)
    }
}

/// Error of [`CancelSale`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Sale`] with the provided ID is canceled already.
    #[display("`Sale(id: {_0})` is canceled already")]
    SaleAlreadyCanceled(#[error(not(source))] sale::Id),

    /// [`Sale`] with the provided ID does not exist.
    #[display("`Sale(id: {_0})` does not exist")]
    SaleNotExists(#[error(not(source))] sale::Id),
}
