//! [`Lot`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Perform, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{lot, Lot},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Decodes a [`Lot`] out of the provided [`Row`].
fn decode(row: &Row) -> Lot {
    Lot {
        id: row.get("id"),
        reference: row.get("reference"),
        status: row.get("status"),
        size: row.get("size"),
        price_per_m2: Money {
            amount: row.get("price_per_m2"),
            currency: row.get("price_per_m2_currency"),
        },
        zoning_code: row.get("zoning_code"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Lot>, lot::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Lot>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Lot>, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: lot::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, reference, status, size, \
                   price_per_m2, price_per_m2_currency, \
                   zoning_code, description, created_at \
            FROM lots \
            WHERE id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(decode))
    }
}

impl<C> Database<Select<By<Option<Lot>, lot::Reference>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Lot>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Lot>, lot::Reference>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let reference: lot::Reference = by.into_inner();

        const SQL: &str = "\
            SELECT id, reference, status, size, \
                   price_per_m2, price_per_m2_currency, \
                   zoning_code, description, created_at \
            FROM lots \
            WHERE reference = $1::VARCHAR \
            LIMIT 1";
        self.query_opt(SQL, &[&reference])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(decode))
    }
}

impl<C> Database<Insert<Lot>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Lot>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(lot): Insert<Lot>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(lot)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Lot>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(lot): Update<Lot>,
    ) -> Result<Self::Ok, Self::Err> {
        let Lot {
            id,
            reference,
            status,
            size,
            price_per_m2,
            zoning_code,
            description,
            created_at,
        } = lot;

        const SQL: &str = "\
            INSERT INTO lots (\
                id, reference, status, size, \
                price_per_m2, price_per_m2_currency, \
                zoning_code, description, created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::INT2, $4::NUMERIC, \
                $5::NUMERIC, $6::INT2, \
                $7::VARCHAR, $8::VARCHAR, $9::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET reference = EXCLUDED.reference, \
                status = EXCLUDED.status, \
                size = EXCLUDED.size, \
                price_per_m2 = EXCLUDED.price_per_m2, \
                price_per_m2_currency = EXCLUDED.price_per_m2_currency, \
                zoning_code = EXCLUDED.zoning_code, \
                description = EXCLUDED.description, \
                created_at = EXCLUDED.created_at";
        self.exec(
            SQL,
            &[
                &id,
                &reference,
                &status,
                &size,
                &price_per_m2.amount,
                &price_per_m2.currency,
                &zoning_code,
                &description,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Lot, lot::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Lot, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: lot::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM lots \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Statement taking a transaction-scoped lock upon a single `Lot`.
///
/// `DO NOTHING` takes no row lock when the conflicting lock row is already
/// committed, so the upsert is required for peers to block until commit.
pub(super) const LOCK_SQL: &str = "\
    INSERT INTO lots_lock \
    VALUES ($1::UUID) \
    ON CONFLICT (id) DO UPDATE \
    SET id = EXCLUDED.id";

impl<C> Database<Lock<By<Lot, lot::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Lot, lot::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: lot::Id = by.into_inner();

        self.query(LOCK_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Perform<read::lot::ReleaseOrphaned>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<lot::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Perform(_): Perform<read::lot::ReleaseOrphaned>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            UPDATE lots \
            SET status = $1::INT2 \
            WHERE status <> $1::INT2 \
              AND NOT EXISTS (SELECT 1 \
                              FROM sales \
                              WHERE sales.lot_id = lots.id) \
            RETURNING id";
        Ok(self
            .query(SQL, &[&lot::Status::Available])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("id"))
            .collect())
    }
}

impl<C> Database<Select<By<read::lot::list::Page, read::lot::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::lot::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::lot::list::Page, read::lot::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::lot::list::Selector {
            arguments,
            filter: read::lot::list::Filter { reference, status },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit()).unwrap() + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });

        let reference_pattern =
            reference.as_ref().map(|r| FuzzPattern::new(r.as_ref()));
        let reference_pattern_idx = reference_pattern.as_ref().map(|r| {
            ps.push(r);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM lots \
             WHERE true \
                   {cursor} \
                   {status_filtering} \
                   {reference_filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
            status_filtering =
                status_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND status = ${idx}::INT2"))
                }),
            reference_filtering = reference_pattern_idx
                .into_iter()
                .format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(reference) \
                         SIMILAR TO LOWER(${idx}::VARCHAR)"
                    ))
                }),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::lot::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::lot::list::TotalCount, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::lot::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::lot::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM lots";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.expect("always exists").get::<_, i32>(0).into())
    }
}
