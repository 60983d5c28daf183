//! [`Command`] for deleting a [`Lot`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{lot, sale, Lot, Payment, Sale},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Lot`] along with every [`Sale`] referencing
/// it (and the [`Payment`]s of those [`Sale`]s).
#[derive(Clone, Copy, Debug)]
pub struct DeleteLot {
    /// ID of the [`Lot`] to delete.
    pub id: lot::Id,
}

impl<Db> Command<DeleteLot> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Lot>, lot::Id>>,
            Ok = Option<Lot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Sale>, lot::Id>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Vec<Payment>, sale::Id>>, Err = Traced<database::Error>>
        + Database<Delete<By<Sale, sale::Id>>, Err = Traced<database::Error>>
        + Database<Delete<By<Lot, lot::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Lot, lot::Id>>, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Sale, sale::Id>>, Err = Traced<database::Error>>,
{
    type Ok = Lot;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteLot) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteLot { id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Lot`.
        tx.execute(Lock(By::<Lot, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let lot = tx
            .execute(Select(By::<Option<Lot>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::LotNotExists(id))
            .map_err(tracerr::wrap!())?;

        let sales = tx
            .execute(Select(By::<Vec<Sale>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for sale in sales {
            tx.execute(Lock(By::<Sale, _>::new(sale.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            tx.execute(Delete(By::<Vec<Payment>, _>::new(sale.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Delete(By::<Sale, _>::new(sale.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Delete(By::<Lot, _>::new(lot.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(lot)
    }
}

/// Error of [`DeleteLot`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Lot`] with the provided ID does not exist.
    #[display("`Lot(id: {_0})` does not exist")]
    LotNotExists(#[error(not(source))] lot::Id),
}
