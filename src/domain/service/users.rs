use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Result, required, search_term};
use crate::auth::PasswordHasher;
use crate::domain::DomainError;
use crate::domain::models::{
    NewAccount, Page, Paginated, ResidentDetails, Role, User, UserProfile, UserUpdate,
    contains_ignore_case,
};
use crate::domain::stats::ResidentStats;
use crate::store::{Collection, Store};

const EMAIL_INDEX: &str = "users:email";
const MIN_PASSWORD_LEN: usize = 6;
const MIN_BARANGAY_PASSWORD_LEN: usize = 8;

/// Self-registration of a resident.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A barangay office account created by an administrator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarangayRegistration {
    pub barangay_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A resident account created by barangay staff.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResident {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub details: ResidentDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Portal the caller is logging into, `resident` or `barangay`.
    pub user_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Accounts, login and resident management.
#[derive(Clone)]
pub struct UserService {
    users: Collection<User>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher) -> Self {
        Self {
            users: Collection::new(store),
            hasher,
        }
    }

    pub async fn get(&self, id: u64) -> Result<Option<User>> {
        Ok(self.users.get(id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let store = self.users.store();
        let Some(id) = store.lookup(EMAIL_INDEX, &email_key(email)).await? else {
            return Ok(None);
        };
        Ok(self.users.get(id).await?)
    }

    /// Creates an account, reserving its email first.
    ///
    /// `conflict` is the message reported when the email is already taken.
    pub async fn create_account(&self, account: NewAccount, conflict: &'static str) -> Result<User> {
        let id = self.users.next_id().await?;
        let key = email_key(&account.email);
        if !self.users.store().claim(EMAIL_INDEX, &key, id).await? {
            return Err(DomainError::Conflict(conflict));
        }

        match self.insert(id, account).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, role = %user.role, "Account created");
                Ok(user)
            }
            Err(e) => {
                if let Err(release) = self.users.store().release(EMAIL_INDEX, &key).await {
                    tracing::warn!("Failed to release email of unsaved account: {release}");
                }
                Err(e)
            }
        }
    }

    async fn insert(&self, id: u64, account: NewAccount) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id,
            name: account.name,
            email: account.email.trim().to_owned(),
            password_hash: self.hasher.hash(&account.password).await?,
            role: account.role,
            details: account.details,
            created_at: now,
            updated_at: now,
        };
        self.users.put(&user).await?;
        Ok(user)
    }

    pub async fn register_resident(&self, input: Registration) -> Result<User> {
        let (Some(first), Some(last), Some(email), Some(password)) = (
            required(&input.first_name),
            required(&input.last_name),
            required(&input.email),
            present(&input.password),
        ) else {
            return Err(DomainError::Validation("All fields are required"));
        };
        check_email(email)?;
        check_password_len(password, MIN_PASSWORD_LEN, "Password must be at least 6 characters long")?;

        let account = NewAccount {
            name: format!("{first} {last}"),
            email: email.to_owned(),
            password: password.to_owned(),
            role: Role::Resident,
            details: ResidentDetails::default(),
        };
        self.create_account(account, "Email already registered").await
    }

    pub async fn register_barangay(&self, input: BarangayRegistration) -> Result<User> {
        let (Some(name), Some(email), Some(password)) = (
            required(&input.barangay_name),
            required(&input.email),
            present(&input.password),
        ) else {
            return Err(DomainError::Validation(
                "Barangay name, email, and password are required",
            ));
        };
        check_email(email)?;
        check_password_len(
            password,
            MIN_BARANGAY_PASSWORD_LEN,
            "Barangay account password must be at least 8 characters long",
        )?;

        let account = NewAccount {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            role: Role::Admin,
            details: ResidentDetails::default(),
        };
        self.create_account(account, "Barangay email already registered")
            .await
    }

    /// Every barangay account, ordered by name.
    pub async fn list_barangays(&self) -> Result<Vec<UserProfile>> {
        let mut barangays: Vec<_> = self
            .users
            .all()
            .await?
            .into_iter()
            .filter(User::is_barangay)
            .map(|user| user.profile())
            .collect();
        barangays.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(barangays)
    }

    /// Checks credentials and the portal the caller is logging into.
    pub async fn authenticate(&self, input: Credentials) -> Result<User> {
        let (Some(email), Some(password)) = (required(&input.email), present(&input.password))
        else {
            return Err(DomainError::Validation("Email and password are required"));
        };

        let Some(user) = self.find_by_email(email).await? else {
            return Err(DomainError::InvalidCredentials);
        };
        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::debug!(user_id = user.id, "Wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        match input.user_type.as_deref() {
            Some("barangay") if !user.is_barangay() => Err(DomainError::NotBarangayAccount),
            Some("resident") if user.is_barangay() => Err(DomainError::NotResidentAccount),
            _ => Ok(user),
        }
    }

    pub async fn change_password(&self, user_id: u64, input: PasswordChange) -> Result<()> {
        let (Some(current), Some(new)) = (
            present(&input.current_password),
            present(&input.new_password),
        ) else {
            return Err(DomainError::Validation(
                "Current password and new password are required",
            ));
        };
        check_password_len(new, MIN_PASSWORD_LEN, "Password must be at least 6 characters long")?;

        let Some(mut user) = self.users.get(user_id).await? else {
            return Err(DomainError::NotFound("User not found"));
        };
        if !self.hasher.verify(current, &user.password_hash).await? {
            return Err(DomainError::IncorrectPassword);
        }

        user.password_hash = self.hasher.hash(new).await?;
        user.updated_at = Utc::now();
        self.users.put(&user).await?;
        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    /// Residents matching the search, newest first.
    pub async fn list_residents(
        &self,
        page: Page,
        search: Option<&str>,
    ) -> Result<Paginated<UserProfile>> {
        let term = search_term(search);
        let mut residents: Vec<_> = self
            .users
            .all()
            .await?
            .into_iter()
            .filter(User::is_resident)
            .filter(|user| {
                term.as_deref().is_none_or(|term| {
                    contains_ignore_case(&user.name, term) || contains_ignore_case(&user.email, term)
                })
            })
            .collect();
        residents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let residents = residents.iter().map(User::profile).collect();
        Ok(page.slice(residents))
    }

    pub async fn create_resident(&self, input: NewResident) -> Result<User> {
        let (Some(first), Some(last), Some(email), Some(password)) = (
            required(&input.first_name),
            required(&input.last_name),
            required(&input.email),
            present(&input.password),
        ) else {
            return Err(DomainError::Validation(
                "First name, last name, email, and password are required",
            ));
        };

        let account = NewAccount {
            name: format!("{first} {last}"),
            email: email.to_owned(),
            password: password.to_owned(),
            role: Role::Resident,
            details: input.details,
        };
        self.create_account(account, "Email already exists").await
    }

    pub async fn get_resident(&self, id: u64) -> Result<User> {
        match self.users.get(id).await? {
            None => Err(DomainError::NotFound("Resident not found")),
            Some(user) if !user.is_resident() => Err(DomainError::NotResident),
            Some(user) => Ok(user),
        }
    }

    /// Loads a resident, treating other account kinds as missing.
    async fn resident(&self, id: u64) -> Result<User> {
        match self.users.get(id).await? {
            Some(user) if user.is_resident() => Ok(user),
            _ => Err(DomainError::NotFound("Resident not found")),
        }
    }

    pub async fn update_resident(&self, id: u64, update: UserUpdate) -> Result<User> {
        let mut user = self.resident(id).await?;
        if update.is_empty() {
            return Err(DomainError::NoFieldsToUpdate);
        }

        update.apply(&mut user, Utc::now());
        self.users.put(&user).await?;
        tracing::info!(user_id = id, "Resident updated");
        Ok(user)
    }

    /// Deletes a resident account and frees its email.
    pub async fn delete_resident(&self, id: u64) -> Result<User> {
        let user = self.resident(id).await?;
        self.users.remove(id).await?;
        self.users
            .store()
            .release(EMAIL_INDEX, &email_key(&user.email))
            .await?;
        tracing::info!(user_id = id, "Resident deleted");
        Ok(user)
    }

    pub async fn resident_stats(&self, now: DateTime<Utc>) -> Result<ResidentStats> {
        let users = self.users.all().await?;
        Ok(ResidentStats::collect(
            users
                .iter()
                .filter(|user| user.is_resident())
                .map(|user| user.created_at),
            now,
        ))
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let plain = |part: &str| {
        !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '@')
    };
    plain(local)
        && plain(domain)
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn check_email(email: &str) -> Result<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(DomainError::Validation("Please provide a valid email address"))
    }
}

fn check_password_len(password: &str, min: usize, message: &'static str) -> Result<()> {
    if password.chars().count() < min {
        return Err(DomainError::Validation(message));
    }
    Ok(())
}
