//! [`Command`] for creating a new [`Expense`].

use common::{operations::Insert, DateTime, Money};
use tracerr::Traced;

use crate::{
    domain::{expense, payment, Expense},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Expense`].
///
/// [`Expense`]s feed reporting only, so no cross-ledger checks apply.
#[derive(Clone, Debug)]
pub struct CreateExpense {
    /// Amount of the new [`Expense`].
    pub amount: Money,

    /// [`expense::Beneficiary`] the new [`Expense`] was paid to.
    pub beneficiary: expense::Beneficiary,

    /// [`expense::Kind`] of the new [`Expense`].
    pub kind: expense::Kind,

    /// [`payment::Receipt`] evidencing the new [`Expense`], if any.
    pub receipt: Option<payment::Receipt>,

    /// [`DateTime`] when the new [`Expense`] was incurred.
    pub date: expense::OperationDateTime,
}

impl<Db> Command<CreateExpense> for Service<Db>
where
    Db: Database<Insert<Expense>, Err = Traced<database::Error>>,
{
    type Ok = Expense;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateExpense) -> Result<Self::Ok, Self::Err> {
        let CreateExpense {
            amount,
            beneficiary,
            kind,
            receipt,
            date,
        } = cmd;

        let expense = Expense {
            id: expense::Id::new(),
            amount,
            beneficiary,
            kind,
            receipt,
            date,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(expense.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(expense)
    }
}

/// Error of [`CreateExpense`] [`Command`] execution.
pub type ExecutionError = database::Error;
