use serde::{Deserialize, Serialize};

use super::common::{deserialize_id, Envelope, NamedRef};

/// An admin account with its roles and effective permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<NamedRef>,
    #[serde(default)]
    pub direct_permissions: Vec<NamedRef>,
    #[serde(default)]
    pub all_permissions: Vec<NamedRef>,
}

impl Admin {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn role_names(&self) -> String {
        self.roles
            .iter()
            .map(|r| format_role_name(&r.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.all_permissions.iter().any(|p| p.name == name)
    }
}

/// "super-admin" -> "Super Admin"; unknown roles are shown as-is.
pub fn format_role_name(name: &str) -> String {
    match name.to_lowercase().as_str() {
        "super-admin" => "Super Admin".to_string(),
        "admin" => "Admin".to_string(),
        _ => name.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCollection {
    #[serde(default)]
    pub admins: Vec<Admin>,
}

pub type AdminsResponse = Envelope<AdminCollection>;

/// The signed-in admin, as returned by `admins/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub admin: Admin,
}

pub type ProfileResponse = Envelope<Profile>;

/// Payload for creating or editing an admin.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<NamedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCollection {
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCollection {
    #[serde(default)]
    pub permissions: Vec<NamedRef>,
}

pub type RolesResponse = Envelope<RoleCollection>;
pub type PermissionsResponse = Envelope<PermissionCollection>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admins_response() {
        let json = r#"{"success": true, "message": "Admins retrieved", "data": {"admins": [
            {"id": "9a1c", "first_name": "Sara", "last_name": "Ali", "email": "sara@example.com",
             "roles": [{"id": 1, "name": "super-admin"}],
             "direct_permissions": [],
             "all_permissions": [{"id": 4, "name": "manage vehicles"}]}]}}"#;

        let resp: AdminsResponse =

            serde_json::from_str(json).expect("Failed to parse admins JSON");
        assert!(resp.success);
        let admin = &resp.data.admins[0];
        assert_eq!(admin.full_name(), "Sara Ali");
        assert_eq!(admin.role_names(), "Super Admin");
        assert!(admin.has_permission("manage vehicles"));
        assert!(!admin.has_permission("delete customers"));
    }

    #[test]
    fn test_parse_profile() {
        let json = r#"{"success": true, "message": "ok", "data": {"admin": {
            "id": 1, "first_name": "Root", "last_name": "", "email": "root@example.com",
            "all_permissions": [{"id": "1", "name": "view dashboard"}]}}}"#;
        let resp: ProfileResponse =
            serde_json::from_str(json).expect("Failed to parse profile JSON");
        assert_eq!(resp.data.admin.full_name(), "Root");
        assert!(resp.data.admin.roles.is_empty());
        assert!(resp.data.admin.has_permission("view dashboard"));
    }

    #[test]
    fn test_format_role_name() {
        assert_eq!(format_role_name("SUPER-ADMIN"), "Super Admin");
        assert_eq!(format_role_name("fleet-manager"), "fleet-manager");
    }

    #[test]
    fn test_admin_request_omits_empty_password() {
        let request = AdminRequest {
            first_name: "Sara".into(),
            email: "sara@example.com".into(),
            ..AdminRequest::default()
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert!(value.get("password").is_none());
    }
}
