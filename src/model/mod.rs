pub mod attendance;
pub mod member;
pub mod policy;
pub mod status;
