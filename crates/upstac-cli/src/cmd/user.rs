use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use upstac_core::config::{Config, WarnLevel};
use upstac_core::types::Role;

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Register a user and print their API token
    Add {
        username: String,
        /// Role(s) to grant: user, tester, doctor, admin
        #[arg(long = "role", value_delimiter = ',', default_value = "user")]
        roles: Vec<String>,
    },
    /// List users and their roles
    List,
    /// Issue a new API token, invalidating the old one
    RotateToken { username: String },
    /// Check the users table for duplicate names, ids or tokens
    Check,
}

pub fn run(root: &Path, subcmd: UserSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        UserSubcommand::Add { username, roles } => add(root, &username, &roles, json),
        UserSubcommand::List => list(root, json),
        UserSubcommand::RotateToken { username } => rotate(root, &username, json),
        UserSubcommand::Check => check(root, json),
    }
}

fn add(root: &Path, username: &str, roles: &[String], json: bool) -> anyhow::Result<()> {
    let roles = roles
        .iter()
        .map(|r| r.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()?;
    let mut config = Config::load(root)?;
    let user = config.add_user(username, roles)?;
    config.save(root).context("failed to save config.yaml")?;
    tracing::info!(username = %user.username, id = user.id, "user added");

    if json {
        print_json(&user)?;
    } else {
        println!("Added user '{}' (id {})", user.username, user.id);
        println!("token: {}", user.api_token);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;

    if json {
        let users: Vec<_> = config
            .users
            .iter()
            .map(|u| {
                serde_json::json!({
                    "id": u.id,
                    "username": u.username,
                    "roles": u.roles,
                })
            })
            .collect();
        return print_json(&users);
    }

    if config.users.is_empty() {
        println!("No users. Add one with: upstac user add <name> --role <role>");
        return Ok(());
    }
    let rows = config
        .users
        .iter()
        .map(|u| {
            let roles: Vec<&str> = u.roles.iter().map(|r| r.as_str()).collect();
            vec![u.id.to_string(), u.username.clone(), roles.join(",")]
        })
        .collect();
    print_table(&["ID", "USERNAME", "ROLES"], rows);
    Ok(())
}

fn rotate(root: &Path, username: &str, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(root)?;
    let token = config.rotate_token(username)?;
    config.save(root).context("failed to save config.yaml")?;

    if json {
        print_json(&serde_json::json!({ "username": username, "token": token }))?;
    } else {
        println!("token: {token}");
    }
    Ok(())
}

fn check(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let warnings = config.validate();

    if json {
        print_json(&warnings)?;
    } else if warnings.is_empty() {
        println!("Config OK ({} users)", config.users.len());
    } else {
        for w in &warnings {
            let tag = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("{tag}: {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config has errors");
    }
    Ok(())
}
