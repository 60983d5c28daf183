//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::{command, infra::database};
use tracerr::{Trace, Traced};

/// JSON API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Creates a new [`Error`] with the provided `code` and `status_code`.
    #[must_use]
    pub fn new(
        code: Code,
        status_code: http::StatusCode,
        msg: &impl ToString,
    ) -> Self {
        Self {
            code,
            status_code,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Creates a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self::new(
            "INTERNAL_SERVER_ERROR",
            http::StatusCode::INTERNAL_SERVER_ERROR,
            msg,
        )
    }

    /// Creates a new [`Error`] representing a malformed request.
    #[must_use]
    pub fn bad_request(msg: &impl ToString) -> Self {
        Self::new("BAD_REQUEST", http::StatusCode::BAD_REQUEST, msg)
    }

    /// Creates a new [`Error`] representing a missing record.
    #[must_use]
    pub fn not_found(msg: &impl ToString) -> Self {
        Self::new("NOT_FOUND", http::StatusCode::NOT_FOUND, msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!("{self}");
        }

        let body = Body {
            code: self.code,
            message: self.message,
        };
        (self.status_code, Json(body)).into_response()
    }
}

/// Serialized body of an [`Error`] response.
#[derive(Clone, Debug, Serialize)]
struct Body {
    /// [`Error`] code.
    code: Code,

    /// [`Error`] message.
    message: String,
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        // A unique index firing means a concurrent writer won the race
        // against an in-transaction pre-check, not a server fault.
        let database::Error::Postgres(e) = self;
        e.is_unique_violation(None)
            .then(|| Error::new("UNIQUE_VIOLATION", http::StatusCode::CONFLICT, self))
    }
}

impl AsError for command::cancel_sale::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::cancel_sale::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::SaleAlreadyCanceled(_) => {
                Error::new("SALE_ALREADY_CANCELED", S::CONFLICT, self)
            }
            E::SaleNotExists(_) => {
                Error::new("SALE_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

impl AsError for command::create_customer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_customer::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::CinAlreadyUsed(_) => {
                Error::new("CIN_ALREADY_USED", S::CONFLICT, self)
            }
            E::PhoneAlreadyUsed(_) => {
                Error::new("PHONE_ALREADY_USED", S::CONFLICT, self)
            }
        })
    }
}

impl AsError for command::create_lot::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_lot::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::ReferenceAlreadyUsed(_) => {
                Error::new("REFERENCE_ALREADY_USED", S::CONFLICT, self)
            }
        })
    }
}

impl AsError for command::create_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_payment::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::CurrencyMismatch { .. } => {
                Error::new("CURRENCY_MISMATCH", S::CONFLICT, self)
            }
            E::ReceiptAlreadyUsed(_) => {
                Error::new("RECEIPT_ALREADY_USED", S::CONFLICT, self)
            }
            E::SaleNotExists(_) => {
                Error::new("SALE_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

impl AsError for command::create_sale::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::create_sale::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::CustomerNotExists(_) => {
                Error::new("CUSTOMER_NOT_EXISTS", S::NOT_FOUND, self)
            }
            E::LotNotAvailable(_) => {
                Error::new("LOT_NOT_AVAILABLE", S::CONFLICT, self)
            }
            E::LotNotExists(_) => {
                Error::new("LOT_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

impl AsError for command::delete_customer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::delete_customer::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::CustomerNotExists(_) => {
                Error::new("CUSTOMER_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

impl AsError for command::delete_lot::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::delete_lot::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::LotNotExists(_) => {
                Error::new("LOT_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

impl AsError for command::delete_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::delete_payment::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::PaymentNotExists(_) => {
                Error::new("PAYMENT_NOT_EXISTS", S::NOT_FOUND, self)
            }
            E::SaleNotExists(_) => {
                Error::new("SALE_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

impl AsError for command::delete_sale::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::delete_sale::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::SaleNotExists(_) => {
                Error::new("SALE_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

impl AsError for command::recompute_sale::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::recompute_sale::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::SaleNotExists(_) => {
                Error::new("SALE_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

impl AsError for command::update_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::update_payment::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::CurrencyMismatch { .. } => {
                Error::new("CURRENCY_MISMATCH", S::CONFLICT, self)
            }
            E::PaymentNotExists(_) => {
                Error::new("PAYMENT_NOT_EXISTS", S::NOT_FOUND, self)
            }
            E::ReceiptAlreadyUsed(_) => {
                Error::new("RECEIPT_ALREADY_USED", S::CONFLICT, self)
            }
            E::SaleNotExists(_) => {
                Error::new("SALE_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

impl AsError for command::update_sale::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use command::update_sale::ExecutionError as E;
        use http::StatusCode as S;

        Some(match self {
            E::Db(e) => return e.try_as_error(),
            E::CurrencyMismatch { .. } => {
                Error::new("CURRENCY_MISMATCH", S::CONFLICT, self)
            }
            E::LotNotAvailable(_) => {
                Error::new("LOT_NOT_AVAILABLE", S::CONFLICT, self)
            }
            E::LotNotExists(_) => {
                Error::new("LOT_NOT_EXISTS", S::NOT_FOUND, self)
            }
            E::SaleAlreadyCanceled(_) => {
                Error::new("SALE_ALREADY_CANCELED", S::CONFLICT, self)
            }
            E::SaleNotExists(_) => {
                Error::new("SALE_NOT_EXISTS", S::NOT_FOUND, self)
            }
        })
    }
}

#[cfg(test)]
mod spec {
    use deadpool_postgres::{ConfigError, CreatePoolError};
    use service::infra::database::postgres;

    use super::*;

    fn db_error() -> database::Error {
        postgres::Error::PoolCreationError(CreatePoolError::Config(
            ConfigError::DbnameMissing,
        ))
        .into()
    }

    #[test]
    fn only_unique_violations_map_to_conflict() {
        assert!(db_error().try_as_error().is_none());
    }

    #[test]
    fn command_db_error_delegates_to_database_mapping() {
        use command::create_payment::ExecutionError as E;

        let error = E::Db(db_error()).as_error();

        assert_eq!(error.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(
            error.status_code,
            http::StatusCode::INTERNAL_SERVER_ERROR,
        );
    }
}
