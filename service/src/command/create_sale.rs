//! [`Command`] for creating a new [`Sale`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{customer, lot, sale, Customer, Lot, Sale},
    infra::{database, Database},
    read::Active,
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Sale`] of a [`Lot`] to a [`Customer`].
#[derive(Clone, Copy, Debug)]
pub struct CreateSale {
    /// ID of the [`Lot`] being sold.
    pub lot_id: lot::Id,

    /// ID of the [`Customer`] purchasing the [`Lot`].
    pub customer_id: customer::Id,

    /// [`DateTime`] of the deal.
    pub date: sale::DealDateTime,
}

impl<Db> Command<CreateSale> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Customer>, customer::Id>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Lot>, lot::Id>>,
            Ok = Option<Lot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Sale>>, lot::Id>>,
            Ok = Option<Active<Sale>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Sale>, Err = Traced<database::Error>>
        + Database<Update<Lot>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Transacted<Db>:
        Database<Lock<By<Lot, lot::Id>>, Err = Traced<database::Error>>,
{
    type Ok = Sale;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateSale) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateSale {
            lot_id,
            customer_id,
            date,
        } = cmd;

        let customer = self
            .database()
            .execute(Select(By::<Option<Customer>, _>::new(customer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CustomerNotExists(customer_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent sales of the same `Lot`.
        tx.execute(Lock(By::<Lot, _>::new(lot_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut lot = tx
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

        let total_price = lot.total_price();
        let sale = Sale {
            id: sale::Id::new(),
            lot_id: lot.id,
            customer_id: customer.id,
            total_price,
            financials: sale::Financials::zeroed(total_price),
            status: sale::Status::Initiated,
            date,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(sale.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        lot.status = lot::Status::Reserved;
        tx.execute(Update(lot))
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

/// Error of [`CreateSale`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Customer`] with the provided ID does not exist.
    #[display("`Customer(id: {_0})` does not exist")]
    CustomerNotExists(#[error(not(source))] customer::Id),

    /// [`Lot`] with the provided ID is not available for sale.
    #[display("`Lot(id: {_0})` is not available for sale")]
    LotNotAvailable(#[error(not(source))] lot::Id),

    /// [`Lot`] with the provided ID does not exist.
    #[display("`Lot(id: {_0})` does not exist")]
    LotNotExists(#[error(not(source))] lot::Id),
}
