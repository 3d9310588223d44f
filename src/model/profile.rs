use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AdminProfile {
    #[schema(example = "Admin User")]
    pub name: String,
    #[schema(example = "Super Admin")]
    pub role: String,
    #[schema(example = "admin@company.com")]
    pub email: String,
    pub phone: String,
    pub location: String,
    /// Data URL of the uploaded avatar
    #[schema(nullable = true)]
    pub avatar: Option<String>,
}

impl Default for AdminProfile {
    fn default() -> Self {
        Self {
            name: "Admin User".to_string(),
            role: "Super Admin".to_string(),
            email: "admin@company.com".to_string(),
            phone: String::new(),
            location: String::new(),
            avatar: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0} must not be empty")]
pub struct InvalidProfile(pub &'static str);

impl AdminProfile {
    /// Trimmed copy, or the first required field that is blank.
    pub fn validated(mut self) -> Result<Self, InvalidProfile> {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        if self.name.is_empty() {
            return Err(InvalidProfile("name"));
        }
        if self.email.is_empty() {
            return Err(InvalidProfile("email"));
        }
        Ok(self)
    }

    /// Badge text shown when there is no avatar, e.g. `AU` for "Admin User".
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_take_first_letter_of_each_word() {
        let mut p = AdminProfile::default();
        assert_eq!(p.initials(), "AU");
        p.name = "  rishav   kumar ".into();
        assert_eq!(p.initials(), "RK");
    }

    #[test]
    fn validation_trims_and_requires_name_and_email() {
        let mut p = AdminProfile::default();
        p.name = "  Ada  ".into();
        assert_eq!(p.clone().validated().unwrap().name, "Ada");

        p.email = " ".into();
        assert_eq!(p.validated().unwrap_err().to_string(), "email must not be empty");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p: AdminProfile = serde_json::from_str(r#"{"name":"Ada Lovelace"}"#).unwrap();
        assert_eq!(p.name, "Ada Lovelace");
        assert_eq!(p.role, "Super Admin");
        assert_eq!(p.avatar, None);
    }
}
