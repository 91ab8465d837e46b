pub mod appointments;
pub mod availability;
pub mod providers;
pub mod slots;
