//! Database entity models
//!
//! Beneficiary records are owned by the profile-management service; the
//! settlement node only reads them (plus test seeding). They carry the
//! per-entity commission override fields consulted by the resolver.

pub mod delivery_partner;
pub mod hotel;
pub mod restaurant;

pub use delivery_partner::DeliveryPartner;
pub use hotel::Hotel;
pub use restaurant::Restaurant;
