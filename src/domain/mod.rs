pub mod map;
pub mod photo;
pub mod poi;
pub mod remote;
