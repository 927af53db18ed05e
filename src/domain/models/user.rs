use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Account role.
///
/// Barangay offices are stored as `admin` accounts; the client portals call
/// them `barangay` users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Resident,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Resident => "resident",
            Role::Admin => "admin",
        }
    }

    /// The portal name of the role.
    pub fn user_type(&self) -> &'static str {
        match self {
            Role::Resident => "resident",
            Role::Admin => "barangay",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CivilStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

/// Optional personal details kept for resident accounts.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentDetails {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub civil_status: Option<CivilStatus>,
    #[serde(default)]
    pub occupation: Option<String>,
}

/// A stored account.
///
/// Never serialize this type into a response; use [`UserProfile`] which has
/// no password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(flatten)]
    pub details: ResidentDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> u64 {
        self.id
    }
}

impl User {
    pub fn is_barangay(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_resident(&self) -> bool {
        self.role == Role::Resident
    }

    /// Splits the stored full name into the first word and the rest.
    pub fn first_and_last_name(&self) -> (String, String) {
        let mut words = self.name.split_whitespace();
        let first = words.next().unwrap_or_default().to_owned();
        let last = words.collect::<Vec<_>>().join(" ");
        (first, last)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            details: self.details.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Public representation of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(flatten)]
    pub details: ResidentDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account. The password is still in clear text.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub details: ResidentDetails,
}

/// Editable account fields. Absent fields are left untouched.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub civil_status: Option<CivilStatus>,
    pub occupation: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
            && self.civil_status.is_none()
            && self.occupation.is_none()
    }

    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            user.name = name;
        }
        let details = &mut user.details;
        if let Some(phone) = self.phone {
            details.phone = Some(phone);
        }
        if let Some(address) = self.address {
            details.address = Some(address);
        }
        if let Some(date_of_birth) = self.date_of_birth {
            details.date_of_birth = Some(date_of_birth);
        }
        if let Some(gender) = self.gender {
            details.gender = Some(gender);
        }
        if let Some(civil_status) = self.civil_status {
            details.civil_status = Some(civil_status);
        }
        if let Some(occupation) = self.occupation {
            details.occupation = Some(occupation);
        }
        user.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        let now = Utc::now();
        User {
            id: 1,
            name: name.into(),
            email: "juan@example.ph".into(),
            password_hash: "pbkdf2-sha256$1$a$b".into(),
            role: Role::Resident,
            details: ResidentDetails::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_first_and_last_name() {
        assert_eq!(
            user("Juan Dela Cruz").first_and_last_name(),
            ("Juan".to_owned(), "Dela Cruz".to_owned())
        );
        assert_eq!(
            user("Madonna").first_and_last_name(),
            ("Madonna".to_owned(), String::new())
        );
    }

    #[test]
    fn test_profile_has_no_password_hash() {
        let json = serde_json::to_value(user("Juan Dela Cruz").profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "resident");
        assert!(json.get("civilStatus").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_stored_user_round_trips_with_details() {
        let mut original = user("Maria Clara");
        original.details.gender = Some(Gender::Female);
        original.details.date_of_birth = NaiveDate::from_ymd_opt(1990, 5, 1);

        let bytes = serde_json::to_vec(&original).unwrap();
        let restored: User = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(restored.password_hash, original.password_hash);
        assert_eq!(restored.details, original.details);
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let mut target = user("Juan Dela Cruz");
        target.details.phone = Some("0917".into());

        let update: UserUpdate =
            serde_json::from_str(r#"{"occupation":"Farmer","email":"ignored@x.ph"}"#).unwrap();
        assert!(!update.is_empty());
        update.apply(&mut target, Utc::now());

        assert_eq!(target.details.occupation.as_deref(), Some("Farmer"));
        assert_eq!(target.details.phone.as_deref(), Some("0917"));
        assert_eq!(target.email, "juan@example.ph");
    }

    #[test]
    fn test_update_without_known_fields_is_empty() {
        let update: UserUpdate = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_role_names() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Admin.user_type(), "barangay");
        assert_eq!(Role::Resident.user_type(), "resident");
    }
}
