//! [`Command`] for deleting a [`Customer`].

use common::operations::{
    By, Commit, Delete, Lock, Perform, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{customer, lot, sale, Customer, Payment, Sale},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Customer`] along with every [`Sale`] of
/// theirs (and the [`Payment`]s of those [`Sale`]s).
///
/// The [`Lot`]s stranded by the cascade are released by the orphan sweep in
/// the same transaction.
///
/// [`Lot`]: crate::domain::Lot
#[derive(Clone, Copy, Debug)]
pub struct DeleteCustomer {
    /// ID of the [`Customer`] to delete.
    pub id: customer::Id,
}

impl<Db> Command<DeleteCustomer> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Sale>, customer::Id>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        > + Database<
            Perform<read::lot::ReleaseOrphaned>,
            Ok = Vec<lot::Id>,
            Err = Traced<database::Error>,
        > + Database<Delete<By<Vec<Payment>, sale::Id>>, Err = Traced<database::Error>>
        + Database<Delete<By<Sale, sale::Id>>, Err = Traced<database::Error>>
        + Database<Delete<By<Customer, customer::Id>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Sale, sale::Id>>, Err = Traced<database::Error>>,
{
    type Ok = Customer;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteCustomer,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCustomer { id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let customer = tx
            .execute(Select(By::<Option<Customer>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(id))
            .map_err(tracerr::wrap!())?;

        let sales = tx
            .execute(Select(By::<Vec<Sale>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for sale in sales {
            // Avoid concurrent actions upon the cascaded `Sale`.
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

        tx.execute(Delete(By::<Customer, _>::new(customer.id)))
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

        Ok(customer)
    }
}

/// Error of [`DeleteCustomer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Customer`] with the provided ID does not exist.
    #[display("`Customer(id: {_0})` does not exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),
}
