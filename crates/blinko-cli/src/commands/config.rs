use std::env;

use crate::cli::ConfigCommands;
use crate::config_profiles::{is_http_url, normalize_text_option, CliProfilesConfig};
use crate::credentials::TokenStore;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            endpoint,
            token,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            endpoint,
            token,
            no_activate,
        ),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    endpoint: Option<String>,
    token: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(profile_name);

    let endpoint = normalize_text_option(endpoint)
        .or_else(|| normalize_text_option(env::var("BLINKO_ENDPOINT").ok()));
    apply_profile_update(&mut config, &profile_name, endpoint, no_activate)?;

    if let Some(token) = normalize_text_option(token) {
        TokenStore::for_profile(&profile_name).save(&token)?;
        println!("Stored API token for profile '{profile_name}' in the system keychain");
    }

    let path = config.save()?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    match config.profile(&profile_name).and_then(|profile| profile.endpoint()) {
        Some(endpoint) => {
            println!("Profile '{profile_name}' uses the Blinko server at {endpoint}");
        }
        None => println!("Profile '{profile_name}' uses the local note database"),
    }
    Ok(())
}

/// Merge an endpoint into `profile_name`, keeping the existing one when none is given.
pub fn apply_profile_update(
    config: &mut CliProfilesConfig,
    profile_name: &str,
    endpoint: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    if let Some(endpoint) = endpoint.as_deref() {
        if !is_http_url(endpoint) {
            return Err(CliError::Config(
                "endpoint must include http:// or https://".to_string(),
            ));
        }
    }

    let profile = config.profile_mut_or_default(profile_name);
    if let Some(endpoint) = endpoint {
        profile.endpoint = Some(endpoint.trim_end_matches('/').to_string());
    }

    if !no_activate {
        config.active_profile = Some(profile_name.to_string());
    }
    Ok(())
}
