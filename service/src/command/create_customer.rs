//! [`Command`] for creating a new [`Customer`].

use common::{
    operations::{
        By, Commit, Insert, Select, Transact, Transacted,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{customer, Customer},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Customer`].
#[derive(Clone, Debug)]
pub struct CreateCustomer {
    /// Full [`customer::Name`] of the new [`Customer`].
    pub name: customer::Name,

    /// Unique [`customer::Phone`] of the new [`Customer`].
    pub phone: customer::Phone,

    /// Unique [`customer::Cin`] of the new [`Customer`].
    pub cin: customer::Cin,

    /// [`customer::Address`] of the new [`Customer`], if known.
    pub address: Option<customer::Address>,
}

impl<Db> Command<CreateCustomer> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Customer>, customer::Phone>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Customer>, customer::Cin>>,
            Ok = Option<Customer>,
            Err = Traced<database::Error>,
        > + Database<Insert<Customer>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Customer;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateCustomer,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCustomer {
            name,
            phone,
            cin,
            address,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let same_phone = tx
            .execute(Select(By::<Option<Customer>, _>::new(phone.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if same_phone.is_some() {
            return Err(tracerr::new!(E::PhoneAlreadyUsed(phone)));
        }

        let same_cin = tx
            .execute(Select(By::<Option<Customer>, _>::new(cin.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if same_cin.is_some() {
            return Err(tracerr::new!(E::CinAlreadyUsed(cin)));
        }

        let customer = Customer {
            id: customer::Id::new(),
            name,
            phone,
            cin,
            address,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(customer.clone()))
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

/// Error of [`CreateCustomer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`customer::Cin`] is used by another [`Customer`] already.
    #[display("`Cin({_0})` is used by another `Customer` already")]
    CinAlreadyUsed(#[error(not(source))] customer::Cin),

    /// [`customer::Phone`] is used by another [`Customer`] already.
    #[display("`Phone({_0})` is used by another `Customer` already")]
    PhoneAlreadyUsed(#[error(not(source))] customer::Phone),
}
