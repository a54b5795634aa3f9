pub mod issuance;
