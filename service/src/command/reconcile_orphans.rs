//! [`Command`] for releasing orphaned [`Lot`]s.

use common::operations::Perform;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Sale;
use crate::{
    domain::{lot, Lot},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] resetting to [`lot::Status::Available`] every [`Lot`] that is
/// not available while no [`Sale`] rows reference it.
///
/// Destructive commands run the sweep themselves, so this [`Command`] is a
/// repair tool: running it on a consistent dataset changes nothing.
#[derive(Clone, Copy, Debug)]
pub struct ReconcileOrphans;

impl<Db> Command<ReconcileOrphans> for Service<Db>
where
    Db: Database<
        Perform<read::lot::ReleaseOrphaned>,
        Ok = Vec<lot::Id>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<lot::Id>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        _: ReconcileOrphans,
    ) -> Result<Self::Ok, Self::Err> {
        let released = self
            .database()
            .execute(Perform(read::lot::ReleaseOrphaned))
            .await
            .map_err(tracerr::wrap!())?;

        if !released.is_empty() {
            tracing::info!(count = released.len(), "released orphaned `Lot`s");
        }

        Ok(released)
    }
}

/// Error of [`ReconcileOrphans`] [`Command`] execution.
pub type ExecutionError = database::Error;
