pub mod account;
pub mod affiliation;
pub mod domain;
pub mod organization;
pub mod scan;

pub use account::Account;
pub use affiliation::{Affiliation, Role};
pub use domain::{Claim, Domain, Ownership};
pub use organization::Organization;
pub use scan::{DmarcSummary, DnsScan, WebScan};
