use crate::core::{DbError, Namespace, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

const MAX_USERNAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 8;

/// Action a privilege allows on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    /// Shard a collection, or evaluate a candidate shard key for it
    ShardCollection,
    /// Change runtime server parameters
    SetParameter,
    /// Read documents
    Find,
}

/// Resource a privilege applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourcePattern {
    /// Exactly one collection
    ExactNamespace(Namespace),
    /// Every non-system collection of one database
    Database(String),
    /// Every non-system collection in every database
    AnyNormalResource,
    /// The cluster itself, never a collection
    Cluster,
    /// Everything
    AnyResource,
}

impl ResourcePattern {
    pub fn for_exact_namespace(nss: &Namespace) -> Self {
        Self::ExactNamespace(nss.clone())
    }

    /// Checks whether a grant on `self` covers the requested resource
    pub fn covers(&self, requested: &ResourcePattern) -> bool {
        match (self, requested) {
            (Self::AnyResource, _) => true,
            (Self::Cluster, Self::Cluster) => true,
            (Self::ExactNamespace(granted), Self::ExactNamespace(nss)) => granted == nss,
            (Self::Database(db), Self::ExactNamespace(nss)) => db == nss.db() && !nss.is_system(),
            (Self::Database(db), Self::Database(requested_db)) => db == requested_db,
            (Self::AnyNormalResource, Self::ExactNamespace(nss)) => !nss.is_system(),
            (Self::AnyNormalResource, Self::Database(_)) => true,
            (Self::AnyNormalResource, Self::AnyNormalResource) => true,
            _ => false,
        }
    }
}

/// A set of actions allowed on one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Privilege {
    pub resource: ResourcePattern,
    pub actions: Vec<ActionType>,
}

impl Privilege {
    pub fn new(resource: ResourcePattern, actions: Vec<ActionType>) -> Self {
        Self { resource, actions }
    }

    /// Unrestricted privilege held by administrators
    pub fn root() -> Self {
        Self::new(
            ResourcePattern::AnyResource,
            vec![ActionType::ShardCollection, ActionType::SetParameter, ActionType::Find],
        )
    }
}

/// User account
#[derive(Debug, Clone)]
pub struct User {
    username: String,
    password_hash: String,
    privileges: Vec<Privilege>,
}

impl User {
    /// Creates a new user
    pub fn new(username: String, password_hash: String, privileges: Vec<Privilege>) -> Self {
        Self {
            username,
            password_hash,
            privileges,
        }
    }

    /// Returns the username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Checks that every action is granted on the resource by some privilege
    pub fn is_authorized_for_actions_on_resource(
        &self,
        resource: &ResourcePattern,
        actions: &[ActionType],
    ) -> bool {
        actions.iter().all(|action| {
            self.privileges
                .iter()
                .any(|p| p.resource.covers(resource) && p.actions.contains(action))
        })
    }
}

/// Accounts allowed to run commands
///
/// Seeded at startup with the administrator and the configured users.
pub struct AuthManager {
    users: RwLock<HashMap<String, User>>,
    hash_cost: u32,
}

impl AuthManager {
    /// The administrator holds [`Privilege::root`].
    pub fn with_admin_and_cost(username: &str, password: &str, hash_cost: u32) -> Result<Self> {
        let admin = User::new(
            username.to_string(),
            Self::hash_password(password, hash_cost)?,
            vec![Privilege::root()],
        );

        Ok(Self {
            users: RwLock::new(HashMap::from([(username.to_string(), admin)])),
            hash_cost,
        })
    }

    fn hash_password(password: &str, cost: u32) -> Result<String> {
        bcrypt::hash(password, cost)
            .map_err(|e| DbError::InternalError(format!("Failed to hash password: {e}")))
    }

    /// Unknown user and wrong password fail identically.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let users = self.users.read().await;

        match users.get(username) {
            Some(user) if bcrypt::verify(password, &user.password_hash).unwrap_or(false) => Ok(user.clone()),
            Some(_) => {
                debug!("Wrong password for user '{}'", username);
                Err(DbError::AuthenticationFailed("Authentication failed.".into()))
            }
            None => {
                debug!("No such user '{}'", username);
                Err(DbError::AuthenticationFailed("Authentication failed.".into()))
            }
        }
    }

    pub async fn create_user(&self, username: &str, password: &str, privileges: Vec<Privilege>) -> Result<()> {
        if username.is_empty() || username.len() > MAX_USERNAME_LEN {
            return Err(DbError::BadValue(format!(
                "username must be 1 to {MAX_USERNAME_LEN} characters"
            )));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DbError::BadValue(format!(
                "password for '{username}' must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        let password_hash = Self::hash_password(password, self.hash_cost)?;
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(DbError::BadValue(format!("User '{username}' already exists")));
        }
        users.insert(username.to_string(), User::new(username.to_string(), password_hash, privileges));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AuthManager {
        AuthManager::with_admin_and_cost("admin", "adminpass", 4).unwrap()
    }

    fn nss(raw: &str) -> Namespace {
        Namespace::parse(raw).unwrap()
    }

    fn shard_collection_on(resource: ResourcePattern) -> Privilege {
        Privilege::new(resource, vec![ActionType::ShardCollection])
    }

    #[tokio::test]
    async fn test_admin_holds_root_privilege() {
        let auth = manager();
        let user = auth.authenticate("admin", "adminpass").await.unwrap();
        assert_eq!(user.username(), "admin");
        assert!(user.is_authorized_for_actions_on_resource(&ResourcePattern::Cluster, &[ActionType::SetParameter]));
        assert!(user.is_authorized_for_actions_on_resource(
            &ResourcePattern::for_exact_namespace(&nss("db.orders")),
            &[ActionType::ShardCollection]
        ));
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let auth = manager();
        let err = auth.authenticate("admin", "wrongpass").await.unwrap_err();
        assert_eq!(err.code(), 18);
        assert!(auth.authenticate("nonexistent", "password123").await.is_err());
    }

    #[tokio::test]
    async fn test_create_user_with_exact_namespace_privilege() {
        let auth = manager();
        auth.create_user(
            "analyst",
            "password123",
            vec![shard_collection_on(ResourcePattern::for_exact_namespace(&nss("db.orders")))],
        )
        .await
        .unwrap();

        let user = auth.authenticate("analyst", "password123").await.unwrap();
        let orders = ResourcePattern::for_exact_namespace(&nss("db.orders"));
        let users = ResourcePattern::for_exact_namespace(&nss("db.users"));

        assert!(user.is_authorized_for_actions_on_resource(&orders, &[ActionType::ShardCollection]));
        assert!(!user.is_authorized_for_actions_on_resource(&users, &[ActionType::ShardCollection]));
        assert!(!user.is_authorized_for_actions_on_resource(&orders, &[ActionType::Find]));
    }

    #[test]
    fn test_cluster_grant_does_not_cover_namespaces() {
        let user = User::new(
            "clusterops".into(),
            "hash".into(),
            vec![shard_collection_on(ResourcePattern::Cluster)],
        );
        let orders = ResourcePattern::for_exact_namespace(&nss("db.orders"));
        assert!(!user.is_authorized_for_actions_on_resource(&orders, &[ActionType::ShardCollection]));
        assert!(user.is_authorized_for_actions_on_resource(&ResourcePattern::Cluster, &[ActionType::ShardCollection]));
    }

    #[test]
    fn test_database_and_normal_resource_grants() {
        let by_db = ResourcePattern::Database("db".into());
        assert!(by_db.covers(&ResourcePattern::for_exact_namespace(&nss("db.orders"))));
        assert!(!by_db.covers(&ResourcePattern::for_exact_namespace(&nss("other.orders"))));
        assert!(!by_db.covers(&ResourcePattern::for_exact_namespace(&nss("db.system.views"))));

        let normal = ResourcePattern::AnyNormalResource;
        assert!(normal.covers(&ResourcePattern::for_exact_namespace(&nss("other.orders"))));
        assert!(!normal.covers(&ResourcePattern::Cluster));

        assert!(ResourcePattern::AnyResource.covers(&ResourcePattern::Cluster));
    }

    #[tokio::test]
    async fn test_duplicate_user() {
        let auth = manager();
        auth.create_user("bob", "password1234", vec![]).await.unwrap();

        let result = auth.create_user("bob", "password1234", vec![]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_create_user_rejects_weak_credentials() {
        let auth = manager();

        let result = auth.create_user("test", "short", vec![]).await;
        assert!(result.unwrap_err().to_string().contains("at least 8 characters"));

        let result = auth.create_user("", "validpass123", vec![]).await;
        assert!(matches!(result, Err(DbError::BadValue(_))));

        assert!(auth.create_user("test3", "validpass123", vec![]).await.is_ok());
    }
}
