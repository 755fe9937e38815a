// Repository modules
pub mod user_repository;
pub mod family_repository;
pub mod event_repository;
pub mod invitation_repository;
pub mod work_schedule_repository;

// Re-export repository types
pub use user_repository::UserRepository;
pub use family_repository::FamilyRepository;
pub use event_repository::EventRepository;
pub use invitation_repository::InvitationRepository;
pub use work_schedule_repository::WorkScheduleRepository;
