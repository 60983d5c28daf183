//! [`Sale`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{customer, lot, sale, Sale},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    query::report::dashboard,
    read::Active,
};

/// Decodes a [`Sale`] out of the provided [`Row`].
fn decode(row: &Row) -> Sale {
    let currency = row.get("currency");
    Sale {
        id: row.get("id"),
        lot_id: row.get("lot_id"),
        customer_id: row.get("customer_id"),
        total_price: Money {
            amount: row.get("total_price"),
            currency,
        },
        financials: sale::Financials {
            total_verified_payments: Money {
                amount: row.get("total_verified_payments"),
                currency,
            },
            balance_due: Money {
                amount: row.get("balance_due"),
                currency,
            },
            paid_percentage: row.get("paid_percentage"),
        },
        status: row.get("status"),
        date: row.get("date"),
        created_at: row.get("created_at"),
    }
}

/// Columns selected when decoding a [`Sale`].
const SELECT_SQL: &str = "\
    SELECT id, lot_id, customer_id, \
           total_price, currency, \
           total_verified_payments, balance_due, paid_percentage, \
           status, date, created_at \
    FROM sales";

impl<C> Database<Select<By<Option<Sale>, sale::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Sale>, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: sale::Id = by.into_inner();

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

impl<C> Database<Select<By<Option<Active<Sale>>, lot::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Active<Sale>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Sale>>, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let lot_id: lot::Id = by.into_inner();

        let sql = format!(
            "{SELECT_SQL} \
             WHERE lot_id = $1::UUID \
               AND status <> $2::INT2 \
             LIMIT 1",
        );
        self.query_opt(&sql, &[&lot_id, &sale::Status::Canceled])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(decode).map(Active))
    }
}

impl<C> Database<Select<By<Vec<Sale>, customer::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let customer_id: customer::Id = by.into_inner();

        let sql = format!(
            "{SELECT_SQL} \
             WHERE customer_id = $1::UUID \
             ORDER BY created_at",
        );
        Ok(self
            .query(&sql, &[&customer_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(decode)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Sale>, lot::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let lot_id: lot::Id = by.into_inner();

        let sql = format!(
            "{SELECT_SQL} \
             WHERE lot_id = $1::UUID \
             ORDER BY created_at",
        );
        Ok(self
            .query(&sql, &[&lot_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(decode)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Sale>, sale::Status>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Sale>, sale::Status>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let status: sale::Status = by.into_inner();

        let sql = format!(
            "{SELECT_SQL} \
             WHERE status = $1::INT2 \
             ORDER BY paid_percentage",
        );
        Ok(self
            .query(&sql, &[&status])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(decode)
            .collect())
    }
}

impl<C> Database<Insert<Sale>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Sale>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(sale)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Sale>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(sale): Update<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        let Sale {
            id,
            lot_id,
            customer_id,
            total_price,
            financials,
            status,
            date,
            created_at,
        } = sale;

        const SQL: &str = "\
            INSERT INTO sales (\
                id, lot_id, customer_id, \
                total_price, currency, \
                total_verified_payments, balance_due, paid_percentage, \
                status, date, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::NUMERIC, $5::INT2, \
                $6::NUMERIC, $7::NUMERIC, $8::NUMERIC, \
                $9::INT2, $10::TIMESTAMPTZ, $11::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET lot_id = EXCLUDED.lot_id, \
                customer_id = EXCLUDED.customer_id, \
                total_price = EXCLUDED.total_price, \
                currency = EXCLUDED.currency, \
                total_verified_payments = \
                    EXCLUDED.total_verified_payments, \
                balance_due = EXCLUDED.balance_due, \
                paid_percentage = EXCLUDED.paid_percentage, \
                status = EXCLUDED.status, \
                date = EXCLUDED.date, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &lot_id,
                &customer_id,
                &total_price.amount,
                &total_price.currency,
                &financials.total_verified_payments.amount,
                &financials.balance_due.amount,
                &financials.paid_percentage,
                &status,
                &date,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Sale, sale::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Sale, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: sale::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM sales \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Statement taking a transaction-scoped lock upon a single `Sale`.
///
/// `DO NOTHING` takes no row lock when the conflicting lock row is already
/// committed, so the upsert is required for peers to block until commit.
pub(super) const LOCK_SQL: &str = "\
    INSERT INTO sales_lock \
    VALUES ($1::UUID) \
    ON CONFLICT (id) DO UPDATE \
    SET id = EXCLUDED.id";

impl<C> Database<Lock<By<Sale, sale::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Sale, sale::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: sale::Id = by.into_inner();

        self.query(LOCK_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<dashboard::SalesCount, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = dashboard::SalesCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<dashboard::SalesCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM sales";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}
