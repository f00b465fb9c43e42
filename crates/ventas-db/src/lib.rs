//! # ventas-db: Persistence and Transaction Engines
//!
//! SQLite persistence for the sales and account-ledger engine, using
//! sqlx for async operations. All multi-step business flows live here
//! as services, each running inside a single transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ventas-core (pure business logic)                              │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                 ventas-db (THIS CRATE)                    │  │
//! │  │                                                           │  │
//! │  │   ┌────────────┐   ┌──────────────┐   ┌──────────────┐   │  │
//! │  │   │  Database  │   │   Services   │   │ Repositories │   │  │
//! │  │   │ (pool.rs)  │   │ (engines:    │   │ (row-level   │   │  │
//! │  │   │            │◄──│  sale,       │──►│  SQL, take a │   │  │
//! │  │   │ SqlitePool │   │  collection, │   │  &mut conn)  │   │  │
//! │  │   │ + deadlines│   │  purchase)   │   │              │   │  │
//! │  │   └────────────┘   └──────────────┘   └──────────────┘   │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  SQLite (WAL, foreign keys ON, embedded migrations)             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, configuration, the `Database` handle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types (wrap domain kinds transparently)
//! - [`repository`] - Row operations, transaction-agnostic
//! - [`service`] - Transaction engines (sale, collection, purchase,
//!   credit, catalog)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ventas_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/ventas.db")).await?;
//!
//! let sale_id = db.sales().create_sale(new_sale).await?;
//! let remaining = db.collections().apply_payment(&sale_id, 5000, "counter").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Service re-exports for convenience
pub use service::catalog::{CatalogService, NewCustomer, NewProduct, NewSupplier};
pub use service::collection::CollectionService;
pub use service::credit::CreditService;
pub use service::purchase::{NewPurchase, PurchaseAccountStatus, PurchaseService};
pub use service::sale::{NewSale, SaleDetails, SaleService};
