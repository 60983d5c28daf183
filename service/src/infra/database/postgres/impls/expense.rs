//! [`Expense`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::Expense,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    query::report::dashboard,
};

/// Decodes an [`Expense`] out of the provided [`Row`].
fn decode(row: &Row) -> Expense {
    Expense {
        id: row.get("id"),
        amount: Money {
            amount: row.get("amount"),
            currency: row.get("currency"),
        },
        beneficiary: row.get("beneficiary"),
        kind: row.get("kind"),
        receipt: row.get("receipt"),
        date: row.get("date"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Vec<Expense>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Expense>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, amount, currency, beneficiary, kind, \
                   receipt, date, created_at \
            FROM expenses \
            ORDER BY date DESC";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(decode)
            .collect())
    }
}

impl<C> Database<Insert<Expense>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(expense): Insert<Expense>,
    ) -> Result<Self::Ok, Self::Err> {
        let Expense {
            id,
            amount,
            beneficiary,
            kind,
            receipt,
            date,
            created_at,
        } = expense;

        const SQL: &str = "\
            INSERT INTO expenses (\
                id, amount, currency, beneficiary, kind, \
                receipt, date, created_at \
            ) VALUES (\
                $1::UUID, $2::NUMERIC, $3::INT2, $4::VARCHAR, $5::INT2, \
                $6::VARCHAR, $7::TIMESTAMPTZ, $8::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &amount.amount,
                &amount.currency,
                &beneficiary,
                &kind,
                &receipt,
                &date,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<dashboard::ExpenseTotal>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<dashboard::ExpenseTotal>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<dashboard::ExpenseTotal>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT currency, SUM(amount) AS total \
            FROM expenses \
            GROUP BY currency";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                dashboard::ExpenseTotal(Money {
                    amount: row.get("total"),
                    currency: row.get("currency"),
                })
            })
            .collect())
    }
}
