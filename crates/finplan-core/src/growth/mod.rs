pub mod compound;
pub mod fixed_deposit;
pub mod ppf;
pub mod projection;
pub mod retirement;
pub mod scenario;
pub mod sip;
