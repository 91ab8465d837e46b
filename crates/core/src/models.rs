pub mod appointment;
pub mod availability;
pub mod blackout;
pub mod policy;
pub mod provider;
pub mod slot;
