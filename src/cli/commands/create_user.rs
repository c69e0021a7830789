//! Create-user command implementation
//!
//! Registers a login and optionally links a patient profile to it.

use crate::adapters::database::create_store;
use crate::config::load_config;
use crate::core::Accounts;
use crate::domain::{ClinicError, NewPatient};
use chrono::NaiveDate;
use clap::Args;

/// Arguments for the create-user command
#[derive(Args, Debug)]
pub struct CreateUserArgs {
    /// Login name
    #[arg(long)]
    pub username: String,

    /// Password (prefer the environment variable over the flag)
    #[arg(long, env = "CLINIC_NEW_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Grant staff access
    #[arg(long)]
    pub staff: bool,

    /// Create a patient profile with this name for the account
    #[arg(long)]
    pub patient_name: Option<String>,

    /// Patient email for booking confirmations
    #[arg(long, requires = "patient_name")]
    pub email: Option<String>,

    /// Patient date of birth (YYYY-MM-DD)
    #[arg(long, requires = "patient_name")]
    pub dob: Option<NaiveDate>,
}

impl CreateUserArgs {
    fn patient_profile(&self) -> Option<NewPatient> {
        let name = self.patient_name.as_deref()?;
        let mut profile = NewPatient::named(name);
        if let Some(email) = &self.email {
            profile = profile.with_email(email.as_str());
        }
        if let Some(dob) = self.dob {
            profile = profile.with_dob(dob);
        }
        Some(profile)
    }

    /// Execute the create-user command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let store = match create_store(&config).await {
            Ok(store) => store,
            Err(e) => {
                eprintln!("❌ Failed to connect to database: {e}");
                return Ok(4);
            }
        };
        let accounts = Accounts::new(store);

        let user = match accounts
            .register_user(&self.username, &self.password, self.staff)
            .await
        {
            Ok(user) => user,
            Err(e @ (ClinicError::Validation(_) | ClinicError::Conflict(_))) => {
                eprintln!("❌ Cannot create user: {e}");
                return Ok(2);
            }
            Err(e) => {
                eprintln!("❌ Failed to create user: {e}");
                return Ok(5);
            }
        };
        println!(
            "✅ Created {} '{}' (id {})",
            if user.is_staff { "staff user" } else { "user" },
            user.username,
            user.id
        );

        if let Some(profile) = self.patient_profile() {
            match accounts.link_patient(&user, profile).await {
                Ok(patient) => println!("✅ Linked patient profile {} (id {})", patient.full_name, patient.id),
                Err(e) => {
                    eprintln!("❌ Failed to link patient profile: {e}");
                    return Ok(2);
                }
            }
        }
        Ok(0)
    }
}
