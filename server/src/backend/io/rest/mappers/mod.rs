pub mod event_mapper;
pub mod family_mapper;
pub mod user_mapper;
pub mod work_mapper;

pub use event_mapper::EventMapper;
pub use family_mapper::FamilyMapper;
pub use user_mapper::UserMapper;
pub use work_mapper::WorkMapper;
