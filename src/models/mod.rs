pub mod earthquake;
pub mod event;
pub mod feed;
pub mod region;
