//! [`Dashboard`] definition.

use std::collections::HashMap;

use common::{
    money::Currency,
    operations::{By, Select},
    Money,
};
use derive_more::{From, Into};
use rust_decimal::Decimal;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Expense, Payment};
use crate::{
    domain::{sale, Sale},
    infra::{database, Database},
    Query, Service,
};

/// Number of the least funded in-progress [`Sale`]s reported.
const LEAST_FUNDED_LIMIT: usize = 5;

/// [`Query`] to assemble the office dashboard: per-currency money flow,
/// sales count, yearly verified totals and the in-progress [`Sale`]s needing
/// attention.
#[derive(Clone, Copy, Debug)]
pub struct Dashboard;

/// Output of the [`Dashboard`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Total count of [`Sale`]s.
    pub total_sales: SalesCount,

    /// Per-currency money flow [`Row`]s.
    pub totals: Vec<Row>,

    /// Per-currency totals of verified [`Payment`]s grouped by year.
    pub verified_by_year: Vec<YearlyTotal>,

    /// In-progress [`Sale`]s with the lowest paid percentage.
    pub least_funded: Vec<Sale>,
}

/// Per-currency money flow row of the [`Output`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Row {
    /// Currency of this [`Row`].
    pub currency: Currency,

    /// Total of verified [`Payment`]s in the currency.
    pub verified_payments: Money,

    /// Total of [`Expense`]s in the currency.
    pub expenses: Money,

    /// Net amount: verified [`Payment`]s minus [`Expense`]s.
    pub net: Money,
}

/// Total count of [`Sale`]s.
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct SalesCount(i32);

/// Per-currency total of verified [`Payment`]s, read from a [`Database`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerifiedTotal(pub Money);

/// Per-currency total of [`Expense`]s, read from a [`Database`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExpenseTotal(pub Money);

/// Per-currency total of verified [`Payment`]s within one year.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct YearlyTotal {
    /// Year the total is calculated for.
    pub year: i32,

    /// Total of verified [`Payment`]s in the year.
    pub total: Money,
}

impl<Db> Query<Dashboard> for Service<Db>
where
    Db: Database<
            Select<By<SalesCount, ()>>,
            Ok = SalesCount,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<VerifiedTotal>, ()>>,
            Ok = Vec<VerifiedTotal>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<ExpenseTotal>, ()>>,
            Ok = Vec<ExpenseTotal>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<YearlyTotal>, ()>>,
            Ok = Vec<YearlyTotal>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Sale>, sale::Status>>,
            Ok = Vec<Sale>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Dashboard) -> Result<Self::Ok, Self::Err> {
        let total_sales = self
            .database()
            .execute(Select(By::<SalesCount, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        let verified = self
            .database()
            .execute(Select(By::<Vec<VerifiedTotal>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        let expenses = self
            .database()
            .execute(Select(By::<Vec<ExpenseTotal>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|ExpenseTotal(m)| (m.currency, m.amount))
            .collect::<HashMap<_, _>>();

        let mut currencies = verified
            .iter()
            .map(|VerifiedTotal(m)| (m.currency, m.amount))
            .collect::<HashMap<_, _>>();
        for currency in expenses.keys() {
            let _ = currencies.entry(*currency).or_insert(Decimal::ZERO);
        }

        let mut totals = currencies
            .into_iter()
            .map(|(currency, verified)| {
                let expensed =
                    expenses.get(&currency).copied().unwrap_or_default();
                Row {
                    currency,
                    verified_payments: Money {
                        amount: verified,
                        currency,
                    },
                    expenses: Money {
                        amount: expensed,
                        currency,
                    },
                    net: Money {
                        amount: verified - expensed,
                        currency,
                    },
                }
            })
            .collect::<Vec<_>>();
        totals.sort_unstable_by_key(|row| row.currency);

        let verified_by_year = self
            .database()
            .execute(Select(By::<Vec<YearlyTotal>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;

        let mut in_progress = self
            .database()
            .execute(Select(By::<Vec<Sale>, _>::new(sale::Status::Ongoing)))
            .await
            .map_err(tracerr::wrap!())?;
        in_progress.sort_by_key(|s| s.financials.paid_percentage);
        in_progress.truncate(LEAST_FUNDED_LIMIT);

        Ok(Output {
            total_sales,
            totals,
            verified_by_year,
            least_funded: in_progress,
        })
    }
}
