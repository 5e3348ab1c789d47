use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "member_id": "M-001",
        "name": "John Doe",
        "department": "Engineering",
        "status": "Active",
        "photo_url": null
    })
)]
pub struct Member {
    #[schema(example = "M-001")]
    pub member_id: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "Active")]
    pub status: String,

    #[schema(nullable = true)]
    pub photo_url: Option<String>,
}

impl Member {
    /// Members with a blank status are treated as active.
    pub fn is_active(&self) -> bool {
        let status = self.status.trim();
        status.is_empty() || status.eq_ignore_ascii_case("active")
    }
}
