pub mod backend;
pub mod safety;
pub mod storage;
