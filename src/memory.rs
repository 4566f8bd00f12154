use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{CreateUserError, NewUser, User, UserStore},
    profiles::{
        services::{merge_fields, prepend_entry, remove_entry},
        Education, Experience, Profile, ProfileFields, ProfileOwner, ProfileStore, Social,
    },
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    /// Insertion order, like the Postgres listing.
    profiles: Vec<Profile>,
}

impl Inner {
    /// Refreshes the joined owner fields; profiles whose user is gone are
    /// hidden, matching the inner join of the SQL store.
    fn populate(&self, profile: &Profile) -> Option<Profile> {
        let user = self.users.get(&profile.user.id)?;
        let mut p = profile.clone();
        p.user = ProfileOwner {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        };
        Some(p)
    }

    fn position(&self, user_id: Uuid) -> Option<usize> {
        self.profiles.iter().position(|p| p.user.id == user_id)
    }

    /// Applies `apply` to the caller's stored profile and returns the result.
    fn edit(&mut self, user_id: Uuid, apply: impl FnOnce(&mut Profile)) -> Option<Profile> {
        let idx = self.position(user_id)?;
        apply(&mut self.profiles[idx]);
        self.populate(&self.profiles[idx])
    }
}

/// In-process store backing both seams; cheap to clone, all clones share data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, CreateUserError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(CreateUserError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            avatar: user.avatar,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner
            .position(user_id)
            .and_then(|idx| inner.populate(&inner.profiles[idx])))
    }

    async fn list(&self) -> anyhow::Result<Vec<Profile>> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.iter().filter_map(|p| inner.populate(p)).collect())
    }

    async fn create(
        &self,
        user_id: Uuid,
        fields: &ProfileFields,
    ) -> anyhow::Result<Option<Profile>> {
        let mut inner = self.inner.write().await;
        if inner.position(user_id).is_some() {
            return Ok(None);
        }
        let user = inner
            .users
            .get(&user_id)
            .ok_or_else(|| anyhow::anyhow!("no user {user_id} for new profile"))?;

        let mut profile = Profile {
            id: Uuid::new_v4(),
            user: ProfileOwner {
                id: user.id,
                name: user.name.clone(),
                avatar: user.avatar.clone(),
            },
            company: None,
            location: None,
            website: None,
            bio: None,
            status: None,
            githubusername: None,
            skills: Vec::new(),
            social: Social::default(),
            experience: Vec::new(),
            education: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        merge_fields(&mut profile, fields);
        inner.profiles.push(profile.clone());
        Ok(Some(profile))
    }

    async fn update(
        &self,
        user_id: Uuid,
        fields: &ProfileFields,
    ) -> anyhow::Result<Option<Profile>> {
        let mut inner = self.inner.write().await;
        Ok(inner.edit(user_id, |p| merge_fields(p, fields)))
    }

    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: &Experience,
    ) -> anyhow::Result<Option<Profile>> {
        let mut inner = self.inner.write().await;
        Ok(inner.edit(user_id, |p| prepend_entry(&mut p.experience, entry.clone())))
    }

    async fn remove_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        let mut inner = self.inner.write().await;
        Ok(inner.edit(user_id, |p| {
            remove_entry(&mut p.experience, entry_id);
        }))
    }

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: &Education,
    ) -> anyhow::Result<Option<Profile>> {
        let mut inner = self.inner.write().await;
        Ok(inner.edit(user_id, |p| prepend_entry(&mut p.education, entry.clone())))
    }

    async fn remove_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        let mut inner = self.inner.write().await;
        Ok(inner.edit(user_id, |p| {
            remove_entry(&mut p.education, entry_id);
        }))
    }

    async fn delete_by_user(&self, user_id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.profiles.len();
        inner.profiles.retain(|p| p.user.id != user_id);
        Ok(inner.profiles.len() != before)
    }
}
