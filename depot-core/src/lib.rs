pub mod memory;
pub mod repository;
pub mod service;

pub use memory::{MemoryLedger, StockLevel};
pub use repository::{ProductLedger, WarehouseLedger};
pub use service::{ProductOperations, ProductService, WarehouseOperations, WarehouseService};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every failure the ledger and the operations above it can report.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The targeted row did not exist, or the statement touched zero rows.
    #[error("{op}: no matching row in {table}")]
    NotFound {
        op: &'static str,
        table: &'static str,
    },

    #[error("{op}: constraint violated on {table}: {detail}")]
    Constraint {
        op: &'static str,
        table: &'static str,
        detail: String,
    },

    #[error("{op}: not enough quantity of {code} in warehouse {warehouse_id}: requested {requested}, available {available}")]
    InsufficientQuantity {
        op: &'static str,
        warehouse_id: i64,
        code: String,
        requested: u64,
        available: u64,
    },

    #[error("{op}: store failure on {table}: {source}")]
    Store {
        op: &'static str,
        table: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("invalid request: {0}")]
    Invalid(String),
}

impl LedgerError {
    pub fn not_found(op: &'static str, table: &'static str) -> Self {
        Self::NotFound { op, table }
    }

    pub fn constraint(op: &'static str, table: &'static str, detail: impl Into<String>) -> Self {
        Self::Constraint {
            op,
            table,
            detail: detail.into(),
        }
    }

    pub fn store(op: &'static str, table: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Store {
            op,
            table,
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientQuantity { .. })
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
