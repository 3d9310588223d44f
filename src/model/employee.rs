use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One roster row as served by the collaborator's `employees` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "EMP-001",
        "full_name": "John Doe",
        "department": "Engineering",
        "email": "john.doe@company.com"
    })
)]
pub struct Employee {
    /// Stable business key, unique across the roster
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "John Doe")]
    pub full_name: String,

    #[serde(default)]
    #[schema(example = "Engineering")]
    pub department: String,

    #[serde(default)]
    #[schema(example = "john.doe@company.com")]
    pub email: String,
}

impl Employee {
    /// Case-insensitive match on name or employee id.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.full_name.to_lowercase().contains(&needle)
            || self.employee_id.to_lowercase().contains(&needle)
    }
}
