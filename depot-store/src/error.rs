use depot_core::{LedgerError, LedgerResult};
use sqlx::error::ErrorKind;

/// SQLSTATE for an arithmetic result outside the column type, such as a
/// BIGINT counter overflowing.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Maps a driver error onto the ledger taxonomy.
pub(crate) fn classify(op: &'static str, table: &'static str, err: sqlx::Error) -> LedgerError {
    if let sqlx::Error::RowNotFound = err {
        return LedgerError::not_found(op, table);
    }

    if let Some(db) = err.as_database_error() {
        if db.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return LedgerError::constraint(op, table, db.message());
        }
        match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => {
                return LedgerError::constraint(op, table, db.message());
            }
            _ => {}
        }
    }

    LedgerError::store(op, table, err)
}

pub(crate) trait StoreResultExt<T> {
    fn ledger(self, op: &'static str, table: &'static str) -> LedgerResult<T>;
}

impl<T> StoreResultExt<T> for Result<T, sqlx::Error> {
    fn ledger(self, op: &'static str, table: &'static str) -> LedgerResult<T> {
        self.map_err(|err| classify(op, table, err))
    }
}

/// A write that matched nothing means the target row is missing.
pub(crate) fn expect_rows(op: &'static str, table: &'static str, affected: u64) -> LedgerResult<()> {
    if affected == 0 {
        return Err(LedgerError::not_found(op, table));
    }
    Ok(())
}

pub(crate) fn to_db(op: &'static str, quantity: u64) -> LedgerResult<i64> {
    i64::try_from(quantity)
        .map_err(|_| LedgerError::Invalid(format!("{}: quantity {} is out of range", op, quantity)))
}

pub(crate) fn from_db(op: &'static str, table: &'static str, value: i64) -> LedgerResult<u64> {
    u64::try_from(value)
        .map_err(|_| LedgerError::store(op, table, format!("negative counter {} read back", value)))
}
