//! [`Command`] for deleting a [`Sale`].

use common::operations::{
    By, Commit, Delete, Lock, Perform, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{lot, sale, Lot, Payment, Sale},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Sale`] along with the [`Payment`]s
/// referencing it.
///
/// The [`Sale`]'s pre-delete status is applied to its [`Lot`] first, then
/// the orphan sweep returns the [`Lot`] to [`lot::Status::Available`] once
/// no [`Sale`] rows reference it anymore.
#[derive(Clone, Copy, Debug)]
pub struct DeleteSale {
    /// ID of the [`Sale`] to delete.
    pub id: sale::Id,
}

impl<Db> Command<DeleteSale> for Service<Db>
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
            Perform<read::lot::ReleaseOrphaned>,
            Ok = Vec<lot::Id>,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Vec<Payment>, sale::Id>>, Err = Traced<database::Error>>
        + Database<Delete<By<Sale, sale::Id>>, Err = Traced<database::Error>>
        + Database<Update<Lot>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Sale, sale::Id>>, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Lot, lot::Id>>, Err = Traced<database::Error>>,
{
    type Ok = Sale;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteSale) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteSale { id } = cmd;

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

        tx.execute(Delete(By::<Vec<Payment>, _>::new(sale.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Delete(By::<Sale, _>::new(sale.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

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

/// Error of [`DeleteSale`] [`Command`] execution.
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
