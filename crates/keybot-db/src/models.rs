/// Row type for the `keys` table.
pub struct KeyRow {
    pub rowid: i64,
    pub user_id: i64,
    pub key_type: String,
    pub key_text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
