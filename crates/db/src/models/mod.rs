pub mod kyc;
pub mod ledger;
