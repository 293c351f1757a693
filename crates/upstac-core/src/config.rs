use crate::error::{Result, UpstacError};
use crate::paths;
use crate::types::Role;
use crate::user::{generate_token, User, UserDirectory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub users: Vec<User>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            server: ServerConfig::default(),
            users: Vec::new(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(UpstacError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Register a user with a fresh API token. Usernames are unique.
    pub fn add_user(
        &mut self,
        username: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<User> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UpstacError::Validation("username must not be blank".into()));
        }
        if self.users.iter().any(|u| u.username == username) {
            return Err(UpstacError::UserExists(username));
        }
        let id = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User::new(id, username, roles).with_token(generate_token());
        self.users.push(user.clone());
        Ok(user)
    }

    /// Replace a user's token, returning the new one.
    pub fn rotate_token(&mut self, username: &str) -> Result<String> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| UpstacError::UserNotFound(username.to_string()))?;
        user.api_token = generate_token();
        Ok(user.api_token.clone())
    }


    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        let mut tokens = HashSet::new();

        for user in &self.users {
            if !names.insert(user.username.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("duplicate username '{}'", user.username),
                });
            }
            if !ids.insert(user.id) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("duplicate user id {} ('{}')", user.id, user.username),
                });
            }
            if user.api_token.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("user '{}' has no api token and cannot sign in", user.username),
                });
            } else if !tokens.insert(user.api_token.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("user '{}' shares an api token with another user", user.username),
                });
            }
            if user.roles.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("user '{}' has no roles", user.username),
                });
            }
        }

        if self.server.port == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "server.port is 0; the OS will pick a port on every start".to_string(),
            });
        }

        warnings
    }
}

impl UserDirectory for Config {
    fn find_by_token(&self, token: &str) -> Option<User> {
        if token.is_empty() {
            return None;
        }
        self.users.iter().find(|u| u.api_token == token).cloned()
    }

    fn find_by_username(&self, username: &str) -> Option<User> {
        self.users.iter().find(|u| u.username == username).cloned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("pune-lab");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.project.name, "pune-lab");
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.server.port, 8080);
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("project:\n  name: x\n").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert!(cfg.users.is_empty());
    }

    #[test]
    fn load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(UpstacError::NotInitialized)
        ));
    }

    #[test]
    fn save_and_load_users() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("lab");
        let t1 = cfg.add_user("t1", [Role::Tester]).unwrap();
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        let found = loaded.find_by_token(&t1.api_token).unwrap();
        assert_eq!(found.username, "t1");
        assert!(found.has_role(Role::Tester));
    }

    #[test]
    fn add_user_assigns_increasing_ids() {
        let mut cfg = Config::new("lab");
        let a = cfg.add_user("a", [Role::Tester]).unwrap();
        let b = cfg.add_user("b", [Role::Doctor]).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(matches!(
            cfg.add_user("a", [Role::Doctor]),
            Err(UpstacError::UserExists(_))
        ));
    }

    #[test]
    fn empty_token_never_matches() {
        let mut cfg = Config::new("lab");
        cfg.users.push(User::new(1, "ghost", [Role::Admin]));
        assert!(cfg.find_by_token("").is_none());
    }

    #[test]
    fn rotate_token_invalidates_old() {
        let mut cfg = Config::new("lab");
        let d1 = cfg.add_user("d1", [Role::Doctor]).unwrap();
        let fresh = cfg.rotate_token("d1").unwrap();
        assert_ne!(fresh, d1.api_token);
        assert!(cfg.find_by_token(&d1.api_token).is_none());
        assert!(cfg.find_by_token(&fresh).is_some());
    }

    #[test]
    fn validate_flags_duplicates_and_roleless_users() {
        let mut cfg = Config::new("lab");
        cfg.users.push(User::new(1, "t1", [Role::Tester]).with_token("same"));
        cfg.users.push(User::new(1, "t1", Vec::<Role>::new()).with_token("same"));
        let warnings = cfg.validate();
        let messages: Vec<_> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("duplicate username")));
        assert!(messages.iter().any(|m| m.contains("duplicate user id")));
        assert!(messages.iter().any(|m| m.contains("shares an api token")));
        assert!(messages.iter().any(|m| m.contains("has no roles")));
    }

    #[test]
    fn validate_clean_config() {
        let mut cfg = Config::new("lab");
        cfg.add_user("t1", [Role::Tester]).unwrap();
        assert!(cfg.validate().is_empty());
    }
}
