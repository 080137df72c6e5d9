//! Domain services
//!
//! One service per entity, all built on the generic [`Repository`].

pub mod complaint;
pub mod field_visit;
pub mod profile;
pub mod repository;
pub mod sales;
pub mod stock;

pub use complaint::{ComplaintFilter, ComplaintService};
pub use field_visit::{FieldVisitFilter, FieldVisitService};
pub use profile::{ProfileService, RetryPolicy, SessionStore};
pub use repository::Repository;
pub use sales::{SaleFilter, SalesService};
pub use stock::StockService;
