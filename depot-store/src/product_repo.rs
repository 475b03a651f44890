use async_trait::async_trait;
use depot_core::{LedgerError, LedgerResult, ProductLedger};
use depot_shared::{AddProduct, DeleteProduct, Product, TransferProduct, WarehouseProduct};
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::error::{expect_rows, from_db, to_db, StoreResultExt};

const PRODUCTS: &str = "products";
const STOCK: &str = "warehouse_products";

const UPSERT_STOCK: &str = r#"
    INSERT INTO warehouse_products (warehouse_id, product_code, available_quantity, reserved_quantity)
    VALUES ($1, $2, $3, 0)
    ON CONFLICT (warehouse_id, product_code) DO UPDATE
    SET available_quantity = warehouse_products.available_quantity + EXCLUDED.available_quantity
"#;

/// Postgres-backed product ledger. Multi-statement operations run in one
/// transaction; dropping it on an early return rolls everything back.
#[derive(Clone)]
pub struct PgProductLedger {
    pool: PgPool,
}

impl PgProductLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub name: String,
    pub size: String,
    pub code: String,
    pub quantity: i64,
}

impl ProductRow {
    pub(crate) fn into_product(self, op: &'static str, table: &'static str) -> LedgerResult<Product> {
        Ok(Product {
            quantity: from_db(op, table, self.quantity)?,
            name: self.name,
            size: self.size,
            code: self.code,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StockRow {
    warehouse_id: i64,
    available_quantity: i64,
    reserved_quantity: i64,
}

/// Locks one stock row for the rest of the transaction.
async fn lock_stock(
    conn: &mut PgConnection,
    op: &'static str,
    warehouse_id: i64,
    code: &str,
) -> LedgerResult<StockRow> {
    sqlx::query_as::<_, StockRow>(
        r#"
        SELECT warehouse_id, available_quantity, reserved_quantity
        FROM warehouse_products
        WHERE warehouse_id = $1 AND product_code = $2
        FOR UPDATE
        "#,
    )
    .bind(warehouse_id)
    .bind(code)
    .fetch_optional(conn)
    .await
    .ledger(op, STOCK)?
    .ok_or_else(|| LedgerError::not_found(op, STOCK))
}

async fn upsert_stock(
    conn: &mut PgConnection,
    op: &'static str,
    warehouse_id: i64,
    code: &str,
    quantity: i64,
) -> LedgerResult<()> {
    let res = sqlx::query(UPSERT_STOCK)
        .bind(warehouse_id)
        .bind(code)
        .bind(quantity)
        .execute(conn)
        .await
        .ledger(op, STOCK)?;
    expect_rows(op, STOCK, res.rows_affected())
}

#[async_trait]
impl ProductLedger for PgProductLedger {
    async fn create_product(&self, product: &Product) -> LedgerResult<()> {
        const OP: &str = "create_product";
        let quantity = to_db(OP, product.quantity)?;

        let res = sqlx::query("INSERT INTO products (name, size, code, quantity) VALUES ($1, $2, $3, $4)")
            .bind(&product.name)
            .bind(&product.size)
            .bind(&product.code)
            .bind(quantity)
            .execute(&self.pool)
            .await
            .ledger(OP, PRODUCTS)?;

        expect_rows(OP, PRODUCTS, res.rows_affected())
    }

    async fn reserve(&self, wp: &WarehouseProduct) -> LedgerResult<()> {
        const OP: &str = "reserve";
        let quantity = to_db(OP, wp.quantity)?;

        let mut tx = self.pool.begin().await.ledger(OP, STOCK)?;
        let row = lock_stock(&mut tx, OP, wp.warehouse_id, &wp.code).await?;

        let available = from_db(OP, STOCK, row.available_quantity)?;
        if available < wp.quantity {
            return Err(LedgerError::InsufficientQuantity {
                op: OP,
                warehouse_id: wp.warehouse_id,
                code: wp.code.clone(),
                requested: wp.quantity,
                available,
            });
        }

        let res = sqlx::query(
            r#"
            UPDATE warehouse_products
            SET available_quantity = available_quantity - $3,
                reserved_quantity = reserved_quantity + $3
            WHERE warehouse_id = $1 AND product_code = $2
            "#,
        )
        .bind(wp.warehouse_id)
        .bind(&wp.code)
        .bind(quantity)
        .execute(&mut *tx)
        .await
        .ledger(OP, STOCK)?;
        expect_rows(OP, STOCK, res.rows_affected())?;

        tx.commit().await.ledger(OP, STOCK)?;
        debug!(warehouse_id = wp.warehouse_id, code = %wp.code, quantity = wp.quantity, "reserved");
        Ok(())
    }

    async fn cancel_reservation(&self, wp: &WarehouseProduct) -> LedgerResult<()> {
        const OP: &str = "cancel_reservation";
        let quantity = to_db(OP, wp.quantity)?;

        let mut tx = self.pool.begin().await.ledger(OP, STOCK)?;
        let row = lock_stock(&mut tx, OP, wp.warehouse_id, &wp.code).await?;

        let reserved = from_db(OP, STOCK, row.reserved_quantity)?;
        if reserved < wp.quantity {
            return Err(LedgerError::InsufficientQuantity {
                op: OP,
                warehouse_id: wp.warehouse_id,
                code: wp.code.clone(),
                requested: wp.quantity,
                available: reserved,
            });
        }

        let res = sqlx::query(
            r#"
            UPDATE warehouse_products
            SET available_quantity = available_quantity + $3,
                reserved_quantity = reserved_quantity - $3
            WHERE warehouse_id = $1 AND product_code = $2
            "#,
        )
        .bind(wp.warehouse_id)
        .bind(&wp.code)
        .bind(quantity)
        .execute(&mut *tx)
        .await
        .ledger(OP, STOCK)?;
        expect_rows(OP, STOCK, res.rows_affected())?;

        tx.commit().await.ledger(OP, STOCK)?;
        debug!(warehouse_id = wp.warehouse_id, code = %wp.code, quantity = wp.quantity, "reservation canceled");
        Ok(())
    }

    async fn transfer(&self, td: &TransferProduct) -> LedgerResult<()> {
        const OP: &str = "transfer";
        let quantity = to_db(OP, td.quantity)?;

        let mut tx = self.pool.begin().await.ledger(OP, STOCK)?;

        // Both rows are locked in warehouse id order, so transfers running in
        // opposite directions queue behind each other instead of deadlocking.
        let locked = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT warehouse_id, available_quantity, reserved_quantity
            FROM warehouse_products
            WHERE product_code = $1 AND warehouse_id IN ($2, $3)
            ORDER BY warehouse_id
            FOR UPDATE
            "#,
        )
        .bind(&td.code)
        .bind(td.warehouse_from_id)
        .bind(td.warehouse_to_id)
        .fetch_all(&mut *tx)
        .await
        .ledger(OP, STOCK)?;

        let source = locked
            .iter()
            .find(|row| row.warehouse_id == td.warehouse_from_id)
            .ok_or_else(|| LedgerError::not_found(OP, STOCK))?;

        let available = from_db(OP, STOCK, source.available_quantity)?;
        if available < td.quantity {
            return Err(LedgerError::InsufficientQuantity {
                op: OP,
                warehouse_id: td.warehouse_from_id,
                code: td.code.clone(),
                requested: td.quantity,
                available,
            });
        }

        let res = sqlx::query(
            r#"
            UPDATE warehouse_products
            SET available_quantity = available_quantity - $3
            WHERE warehouse_id = $1 AND product_code = $2
            "#,
        )
        .bind(td.warehouse_from_id)
        .bind(&td.code)
        .bind(quantity)
        .execute(&mut *tx)
        .await
        .ledger(OP, STOCK)?;
        expect_rows(OP, STOCK, res.rows_affected())?;

        upsert_stock(&mut tx, OP, td.warehouse_to_id, &td.code, quantity).await?;

        tx.commit().await.ledger(OP, STOCK)?;
        debug!(
            code = %td.code,
            from = td.warehouse_from_id,
            to = td.warehouse_to_id,
            quantity = td.quantity,
            "transferred"
        );
        Ok(())
    }

    async fn add_stock(&self, ad: &AddProduct) -> LedgerResult<()> {
        const OP: &str = "add_stock";
        let quantity = to_db(OP, ad.quantity)?;

        let mut tx = self.pool.begin().await.ledger(OP, PRODUCTS)?;

        let res = sqlx::query("UPDATE products SET quantity = quantity + $1 WHERE code = $2")
            .bind(quantity)
            .bind(&ad.code)
            .execute(&mut *tx)
            .await
            .ledger(OP, PRODUCTS)?;
        expect_rows(OP, PRODUCTS, res.rows_affected())?;

        upsert_stock(&mut tx, OP, ad.warehouse_id, &ad.code, quantity).await?;

        tx.commit().await.ledger(OP, STOCK)?;
        debug!(warehouse_id = ad.warehouse_id, code = %ad.code, quantity = ad.quantity, "stock added");
        Ok(())
    }

    async fn delete_product(&self, dp: &DeleteProduct) -> LedgerResult<Product> {
        const OP: &str = "delete_product";

        // Stock rows go with it through ON DELETE CASCADE.
        sqlx::query_as::<_, ProductRow>(
            "DELETE FROM products WHERE code = $1 RETURNING name, size, code, quantity",
        )
        .bind(&dp.code)
        .fetch_optional(&self.pool)
        .await
        .ledger(OP, PRODUCTS)?
        .ok_or_else(|| LedgerError::not_found(OP, PRODUCTS))?
        .into_product(OP, PRODUCTS)
    }
}
