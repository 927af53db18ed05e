//! Startup data: the administrator account and the sample announcements.

use chrono::{NaiveDate, NaiveTime};
use secrecy::ExposeSecret;

use crate::config::SeedConfig;
use crate::domain::DomainError;
use crate::domain::models::{
    AnnouncementType, NewAccount, NewAnnouncement, Priority, ResidentDetails, Role, User,
};
use crate::domain::service::{Actor, AnnouncementService, UserService};

pub const ADMIN_NAME: &str = "Barangay Administrator";

struct Sample {
    title: &'static str,
    content: &'static str,
    kind: AnnouncementType,
    priority: Priority,
    date: (i32, u32, u32),
    hour: u32,
    location: &'static str,
}

const SAMPLES: [Sample; 5] = [
    Sample {
        title: "Community Clean-up Drive",
        content: "Join us this Saturday for our monthly environmental campaign. Bring your own \
                  cleaning materials and help keep our barangay clean and green.",
        kind: AnnouncementType::Event,
        priority: Priority::High,
        date: (2024, 2, 3),
        hour: 8,
        location: "Barangay Hall",
    },
    Sample {
        title: "Free Medical Check-up",
        content: "The Municipal Health Center will be offering free medical consultations and \
                  basic health screening for all residents.",
        kind: AnnouncementType::Health,
        priority: Priority::Medium,
        date: (2024, 2, 5),
        hour: 9,
        location: "Health Center",
    },
    Sample {
        title: "Water Service Interruption",
        content: "Scheduled maintenance will cause water service interruption in selected areas. \
                  Please store water in advance.",
        kind: AnnouncementType::Notice,
        priority: Priority::High,
        date: (2024, 2, 1),
        hour: 6,
        location: "Zone 1-3",
    },
    Sample {
        title: "Barangay Assembly Meeting",
        content: "Monthly barangay assembly meeting to discuss community issues and upcoming \
                  projects. All residents are welcome to attend.",
        kind: AnnouncementType::Event,
        priority: Priority::Medium,
        date: (2024, 2, 10),
        hour: 14,
        location: "Barangay Hall",
    },
    Sample {
        title: "Senior Citizens Benefits Distribution",
        content: "Distribution of quarterly benefits for senior citizens. Please bring valid ID \
                  and senior citizen card.",
        kind: AnnouncementType::General,
        priority: Priority::Medium,
        date: (2024, 2, 7),
        hour: 10,
        location: "Barangay Office",
    },
];

impl Sample {
    fn to_announcement(&self) -> NewAnnouncement {
        let (year, month, day) = self.date;
        NewAnnouncement {
            title: Some(self.title.to_owned()),
            content: Some(self.content.to_owned()),
            kind: Some(self.kind),
            priority: Some(self.priority),
            event_date: NaiveDate::from_ymd_opt(year, month, day),
            event_time: NaiveTime::from_hms_opt(self.hour, 0, 0),
            location: Some(self.location.to_owned()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub announcements_created: usize,
}

/// Makes sure the administrator exists and publishes the sample
/// announcements when there are none yet. Running it again is a no-op.
pub async fn seed(
    config: &SeedConfig,
    users: &UserService,
    announcements: &AnnouncementService,
) -> Result<SeedReport, DomainError> {
    let mut report = SeedReport::default();

    let admin = match users.find_by_email(&config.admin_email).await? {
        Some(admin) => admin,
        None => {
            report.admin_created = true;
            create_admin(config, users).await?
        }
    };

    if announcements.count().await? == 0 {
        let actor = Actor {
            id: admin.id,
            role: admin.role,
        };
        for sample in &SAMPLES {
            announcements.create(actor, sample.to_announcement()).await?;
            report.announcements_created += 1;
        }
    }

    tracing::info!(
        admin_created = report.admin_created,
        announcements = report.announcements_created,
        "Seed data applied"
    );
    Ok(report)
}

async fn create_admin(config: &SeedConfig, users: &UserService) -> Result<User, DomainError> {
    let account = NewAccount {
        name: ADMIN_NAME.to_owned(),
        email: config.admin_email.clone(),
        password: config.admin_password.expose_secret().to_owned(),
        role: Role::Admin,
        details: ResidentDetails::default(),
    };
    users.create_account(account, "Email already registered").await
}
