pub mod event;
pub mod family;
pub mod invitation;
pub mod user;
pub mod work_pattern;
