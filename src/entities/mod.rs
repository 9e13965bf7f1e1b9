pub mod prelude;

pub mod uploads;

/// An upload record as persisted in the `uploads` table.
pub type UploadRecord = uploads::Model;
