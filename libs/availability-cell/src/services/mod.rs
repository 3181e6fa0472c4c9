pub mod availability;
pub mod ledger;
pub mod schedule;
pub mod slots;

pub use availability::AvailabilityService;
pub use ledger::BookingLedger;
pub use schedule::WorkSchedule;
pub use slots::SlotGenerator;
