pub mod batch;
pub mod metadata_store;
pub mod storage;
pub mod uploader;
