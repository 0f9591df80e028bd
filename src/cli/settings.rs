use clap::Args as ClapArgs;

use super::Tracker;

#[derive(ClapArgs, Debug)]
pub struct SettingsCommand {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long, help = "Url notified on every entry change. Empty string turns it off")]
    webhook_url: Option<String>,
}

impl SettingsCommand {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.webhook_url.is_none()
    }
}

pub fn process_settings_command(tracker: &mut Tracker, command: SettingsCommand) {
    let mut settings = tracker.settings();
    if !command.is_empty() {
        if let Some(name) = command.name {
            settings.name = name;
        }
        if let Some(email) = command.email {
            settings.email = email;
        }
        if let Some(url) = command.webhook_url {
            settings.webhook_url = url.trim().to_owned();
        }
        tracker.update_settings(&settings);
    }

    println!("Name:        {}", settings.name);
    println!("Email:       {}", settings.email);
    println!(
        "Webhook url: {}",
        if settings.webhook_url.is_empty() {
            "(none)"
        } else {
            &settings.webhook_url
        }
    );
}

pub fn process_reset(tracker: &mut Tracker, confirm: bool) {
    if !confirm {
        println!(
            "This deletes {} projects and {} entries. Run again with --confirm to do it",
            tracker.projects().len(),
            tracker.time_entries().len()
        );
        return;
    }
    tracker.delete_all_data();
    println!("All projects and entries were deleted");
}
