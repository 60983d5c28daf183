//! [`Payment`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{payment, sale, Payment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    query::report::dashboard,
};

/// Decodes a [`Payment`] out of the provided [`Row`].
fn decode(row: &Row) -> Payment {
    Payment {
        id: row.get("id"),
        sale_id: row.get("sale_id"),
        amount: Money {
            amount: row.get("amount"),
            currency: row.get("currency"),
        },
        method: row.get("method"),
        status: row.get("status"),
        receipt: row.get("receipt"),
        date: row.get("date"),
        created_at: row.get("created_at"),
    }
}

/// Columns selected when decoding a [`Payment`].
const SELECT_SQL: &str = "\
    SELECT id, sale_id, amount, currency, \
           method, status, receipt, date, created_at \
    FROM payments";

impl<C> Database<Select<By<Option<Payment>, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: payment::Id = by.into_inner();

        let sql = format!(
            "{SELECT_SQL} \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(decode))
    }
}

impl<C> Database<Select<By<Option<Payment>, payment::Receipt>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Receipt>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let receipt: payment::Receipt = by.into_inner();

        let sql = format!(
            "{SELECT_SQL} \
             WHERE receipt = $1::VARCHAR \
             LIMIT 1",
        );
        self.query_opt(&sql, &[&receipt])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(decode))
    }
}

impl<C> Database<Select<By<Vec<Payment>, sale::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let sale_id: sale::Id = by.into_inner();

        let sql = format!(
            "{SELECT_SQL} \
             WHERE sale_id = $1::UUID \
             ORDER BY created_at",
        );
        Ok(self
            .query(&sql, &[&sale_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(decode)
            .collect())
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(payment))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            sale_id,
            amount,
            method,
            status,
            receipt,
            date,
            created_at,
        } = payment;

        const SQL: &str = "\
            INSERT INTO payments (\
                id, sale_id, amount, currency, \
                method, status, receipt, date, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::NUMERIC, $4::INT2, \
                $5::INT2, $6::INT2, $7::VARCHAR, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET sale_id = EXCLUDED.sale_id, \
                amount = EXCLUDED.amount, \
                currency = EXCLUDED.currency, \
                method = EXCLUDED.method, \
                status = EXCLUDED.status, \
                receipt = EXCLUDED.receipt, \
                date = EXCLUDED.date, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &sale_id,
                &amount.amount,
                &amount.currency,
                &method,
                &status,
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

impl<C> Database<Delete<By<Payment, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Payment, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: payment::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM payments \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Vec<Payment>, sale::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Payment>, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let sale_id: sale::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM payments \
            WHERE sale_id = $1::UUID";
        self.exec(SQL, &[&sale_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<dashboard::VerifiedTotal>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<dashboard::VerifiedTotal>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<dashboard::VerifiedTotal>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT currency, SUM(amount) AS total \
            FROM payments \
            WHERE status = $1::INT2 \
            GROUP BY currency";
        Ok(self
            .query(SQL, &[&payment::Status::Verified])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                dashboard::VerifiedTotal(Money {
                    amount: row.get("total"),
                    currency: row.get("currency"),
                })
            })
            .collect())
    }
}

impl<C> Database<Select<By<Vec<dashboard::YearlyTotal>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<dashboard::YearlyTotal>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<dashboard::YearlyTotal>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT EXTRACT(YEAR FROM date)::INT4 AS year, \
                   currency, \
                   SUM(amount) AS total \
            FROM payments \
            WHERE status = $1::INT2 \
            GROUP BY year, currency \
            ORDER BY year, currency";
        Ok(self
            .query(SQL, &[&payment::Status::Verified])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| dashboard::YearlyTotal {
                year: row.get("year"),
                total: Money {
                    amount: row.get("total"),
                    currency: row.get("currency"),
                },
            })
            .collect())
    }
}
