use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per remote object key.
///
/// Column names follow the on-disk layout of existing `uploads.db` files.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "uploads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub file_name: String,
    pub bucket_name: String,
    pub s3_prefix: String,
    #[sea_orm(column_name = "s3_key", unique)]
    pub remote_key: String,
    #[sea_orm(column_name = "file_hash")]
    pub content_hash: String,
    #[sea_orm(column_name = "timestamp")]
    pub uploaded_at: DateTimeUtc,
    #[sea_orm(column_type = "Text")]
    pub allowed_users: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Principals allowed to access this object, in stored order.
    pub fn allowed_users_list(&self) -> Vec<String> {
        self.allowed_users
            .split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect()
    }
}
