//! # Catalog Service
//!
//! Master data: customers, products, suppliers, and the payment method
//! catalog. Single-row reads and writes; nothing here opens a
//! multi-statement transaction.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::{customer, payment, product, purchase};
use crate::service::new_id;
use ventas_core::{
    Customer, CustomerStatus, PaymentType, Product, Supplier, ValidationError,
};

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub identity_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stock: i64,
    pub stock_minimum: i64,
    pub supplier_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
}

// =============================================================================
// Catalog Service
// =============================================================================

/// Master data registration and lookup.
#[derive(Debug, Clone)]
pub struct CatalogService {
    pool: SqlitePool,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogService { pool }
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    /// Registers a customer and returns their id. New customers start
    /// `active`; an identity number may be added later but is required
    /// before any credit sale.
    pub async fn add_customer(&self, input: NewCustomer) -> DbResult<String> {
        if input.first_name.trim().is_empty() {
            return Err(DbError::Domain(
                ValidationError::Required { field: "first_name" }.into(),
            ));
        }
        if input.last_name.trim().is_empty() {
            return Err(DbError::Domain(
                ValidationError::Required { field: "last_name" }.into(),
            ));
        }

        let new_customer = Customer {
            id: new_id(),
            first_name: input.first_name,
            last_name: input.last_name,
            identity_number: input.identity_number,
            address: input.address,
            phone: input.phone,
            email: input.email,
            status: CustomerStatus::Active,
            created_at: Utc::now(),
        };

        let mut conn = self.pool.acquire().await?;
        customer::insert(&mut conn, &new_customer).await?;

        info!(customer_id = %new_customer.id, "customer registered");
        Ok(new_customer.id)
    }

    pub async fn get_customer(&self, id: &str) -> DbResult<Customer> {
        let mut conn = self.pool.acquire().await?;
        customer::get(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("customer", id))
    }

    /// Blocks a customer from further credit sales. Cash sales remain
    /// allowed.
    pub async fn block_customer(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        customer::set_status(&mut conn, id, CustomerStatus::Blocked).await?;
        info!(customer_id = %id, "customer blocked");
        Ok(())
    }

    /// Restores a blocked customer to active.
    pub async fn unblock_customer(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        customer::set_status(&mut conn, id, CustomerStatus::Active).await?;
        info!(customer_id = %id, "customer unblocked");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Registers a product with its opening stock and reorder
    /// threshold, returning its id.
    pub async fn add_product(&self, input: NewProduct) -> DbResult<String> {
        if input.name.trim().is_empty() {
            return Err(DbError::Domain(
                ValidationError::Required { field: "name" }.into(),
            ));
        }
        if input.stock < 0 {
            return Err(DbError::Domain(
                ValidationError::MustNotBeNegative {
                    field: "stock",
                    value: input.stock,
                }
                .into(),
            ));
        }
        if input.stock_minimum < 0 {
            return Err(DbError::Domain(
                ValidationError::MustNotBeNegative {
                    field: "stock_minimum",
                    value: input.stock_minimum,
                }
                .into(),
            ));
        }

        let now = Utc::now();
        let new_product = Product {
            id: new_id(),
            name: input.name,
            description: input.description,
            category: input.category,
            stock: input.stock,
            stock_minimum: input.stock_minimum,
            supplier_id: input.supplier_id,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.pool.acquire().await?;
        product::insert(&mut conn, &new_product).await?;

        info!(product_id = %new_product.id, name = %new_product.name, "product registered");
        Ok(new_product.id)
    }

    pub async fn get_product(&self, id: &str) -> DbResult<Product> {
        let mut conn = self.pool.acquire().await?;
        product::get(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("product", id))
    }

    /// Products at or below their reorder threshold, lowest stock
    /// first.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        product::list_low_stock(&mut conn).await
    }

    // -------------------------------------------------------------------------
    // Suppliers
    // -------------------------------------------------------------------------

    /// Registers a supplier and returns its id.
    pub async fn add_supplier(&self, input: NewSupplier) -> DbResult<String> {
        if input.name.trim().is_empty() {
            return Err(DbError::Domain(
                ValidationError::Required { field: "name" }.into(),
            ));
        }

        let new_supplier = Supplier {
            id: new_id(),
            name: input.name,
            address: input.address,
            contact: input.contact,
            created_at: Utc::now(),
        };

        let mut conn = self.pool.acquire().await?;
        purchase::insert_supplier(&mut conn, &new_supplier).await?;

        info!(supplier_id = %new_supplier.id, "supplier registered");
        Ok(new_supplier.id)
    }

    pub async fn get_supplier(&self, id: &str) -> DbResult<Supplier> {
        let mut conn = self.pool.acquire().await?;
        purchase::get_supplier(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("supplier", id))
    }

    // -------------------------------------------------------------------------
    // Payment Types
    // -------------------------------------------------------------------------

    /// The payment method catalog (seeded by migration).
    pub async fn payment_types(&self) -> DbResult<Vec<PaymentType>> {
        let mut conn = self.pool.acquire().await?;
        payment::list_payment_types(&mut conn).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use ventas_core::CoreError;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_customer_round_trip() {
        let db = test_db().await;

        let id = db
            .catalog()
            .add_customer(NewCustomer {
                first_name: "Maria".to_string(),
                last_name: "Choque".to_string(),
                identity_number: Some("12345678".to_string()),
                address: Some("Av. Central 42".to_string()),
                phone: None,
                email: None,
            })
            .await
            .unwrap();

        let found = db.catalog().get_customer(&id).await.unwrap();
        assert_eq!(found.first_name, "Maria");
        assert_eq!(found.status, CustomerStatus::Active);
        assert_eq!(found.identity_number.as_deref(), Some("12345678"));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let db = test_db().await;

        let err = db
            .catalog()
            .add_customer(NewCustomer {
                first_name: "  ".to_string(),
                last_name: "Choque".to_string(),
                identity_number: None,
                address: None,
                phone: None,
                email: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_identity_number_rejected() {
        let db = test_db().await;

        let input = NewCustomer {
            first_name: "Maria".to_string(),
            last_name: "Choque".to_string(),
            identity_number: Some("12345678".to_string()),
            address: None,
            phone: None,
            email: None,
        };
        db.catalog().add_customer(input.clone()).await.unwrap();

        let err = db.catalog().add_customer(input).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_negative_stock_rejected() {
        let db = test_db().await;

        let err = db
            .catalog()
            .add_product(NewProduct {
                name: "Broken".to_string(),
                description: None,
                category: None,
                stock: -1,
                stock_minimum: 0,
                supplier_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = test_db().await;
        let catalog = db.catalog();

        catalog
            .add_product(NewProduct {
                name: "Plenty".to_string(),
                description: None,
                category: None,
                stock: 50,
                stock_minimum: 5,
                supplier_id: None,
            })
            .await
            .unwrap();
        catalog
            .add_product(NewProduct {
                name: "Scarce".to_string(),
                description: None,
                category: None,
                stock: 2,
                stock_minimum: 5,
                supplier_id: None,
            })
            .await
            .unwrap();

        let low = catalog.low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Scarce");
    }

    #[tokio::test]
    async fn test_payment_types_seeded() {
        let db = test_db().await;

        let types = db.catalog().payment_types().await.unwrap();
        let ids: Vec<&str> = types.iter().map(|t| t.id.as_str()).collect();
        assert!(ids.contains(&"pt-cash"));
        assert!(ids.contains(&"pt-card"));
        assert!(ids.contains(&"pt-transfer"));
    }
}
