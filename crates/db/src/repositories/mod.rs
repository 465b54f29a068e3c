pub mod kyc_repo;
pub mod ledger_repo;

pub use kyc_repo::KycRepo;
pub use ledger_repo::LedgerRepo;
