pub mod asset;
pub mod attendance;
pub mod audit;
pub mod coordinates;
pub mod org;
pub mod profile;
pub mod schedule;
pub mod spare_part;
pub mod ticket;
