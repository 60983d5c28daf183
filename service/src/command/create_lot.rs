//! [`Command`] for creating a new [`Lot`].

use common::{
    operations::{
        By, Commit, Insert, Select, Transact, Transacted,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{lot, Lot},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Lot`].
///
/// A new [`Lot`] is always [`lot::Status::Available`].
#[derive(Clone, Debug)]
pub struct CreateLot {
    /// Unique [`lot::Reference`] of the new [`Lot`].
    pub reference: lot::Reference,

    /// [`lot::Size`] of the new [`Lot`] in square meters.
    pub size: lot::Size,

    /// Price per square meter of the new [`Lot`].
    pub price_per_m2: Money,

    /// [`lot::ZoningCode`] of the new [`Lot`].
    pub zoning_code: lot::ZoningCode,

    /// [`lot::Description`] of the new [`Lot`], if any.
    pub description: Option<lot::Description>,
}

impl<Db> Command<CreateLot> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Lot>, lot::Reference>>,
            Ok = Option<Lot>,
            Err = Traced<database::Error>,
        > + Database<Insert<Lot>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Lot;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateLot) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateLot {
            reference,
            size,
            price_per_m2,
            zoning_code,
            description,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let existing = tx
            .execute(Select(By::<Option<Lot>, _>::new(reference.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::ReferenceAlreadyUsed(reference)));
        }

        let lot = Lot {
            id: lot::Id::new(),
            reference,
            status: lot::Status::Available,
            size,
            price_per_m2,
            zoning_code,
            description,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(lot.clone()))
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

/// Error of [`CreateLot`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`lot::Reference`] is used by another [`Lot`] already.
    #[display("`Reference({_0})` is used by another `Lot` already")]
    ReferenceAlreadyUsed(#[error(not(source))] lot::Reference),
}
