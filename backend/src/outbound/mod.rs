//! Outbound adapters implementing the domain ports.
//!
//! Only PostgreSQL persistence lives here. Adapters convert between domain
//! types and storage representations and hold no business rules.

pub mod persistence;
