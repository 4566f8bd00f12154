use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::profiles::repo_types::{Education, Experience, Profile, ProfileFields, ProfileRow};

/// Persistence seam for profile documents.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    async fn list(&self) -> anyhow::Result<Vec<Profile>>;
    /// `None` if the user already has a profile.
    async fn create(&self, user_id: Uuid, fields: &ProfileFields)
        -> anyhow::Result<Option<Profile>>;
    /// Merge-updates the caller's profile; `None` if it does not exist.
    async fn update(&self, user_id: Uuid, fields: &ProfileFields)
        -> anyhow::Result<Option<Profile>>;

    // Entry operations touch only their own list and return `None` when the
    // user has no profile. Removing an unknown id leaves the list unchanged.
    async fn add_experience(&self, user_id: Uuid, entry: &Experience)
        -> anyhow::Result<Option<Profile>>;
    async fn remove_experience(&self, user_id: Uuid, entry_id: Uuid)
        -> anyhow::Result<Option<Profile>>;
    async fn add_education(&self, user_id: Uuid, entry: &Education)
        -> anyhow::Result<Option<Profile>>;
    async fn remove_education(&self, user_id: Uuid, entry_id: Uuid)
        -> anyhow::Result<Option<Profile>>;
    /// Returns whether a record was removed.
    async fn delete_by_user(&self, user_id: Uuid) -> anyhow::Result<bool>;
}

const SELECT_PROFILE: &str = r#"
    SELECT p.id, p.user_id, u.name AS user_name, u.avatar AS user_avatar,
           p.company, p.location, p.website, p.bio, p.status, p.githubusername,
           p.skills, p.social, p.experience, p.education, p.created_at
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

#[derive(Clone)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let sql = format!("{SELECT_PROFILE} WHERE p.user_id = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("select profile by user")?;
        Ok(row.map(Profile::from))
    }

    /// `column` is one of the jsonb list columns, never user input.
    async fn prepend_entry<T: Serialize + Sync>(
        &self,
        column: &'static str,
        user_id: Uuid,
        entry: &T,
    ) -> anyhow::Result<Option<Profile>> {
        let sql = format!(
            "UPDATE profiles \
             SET {column} = jsonb_build_array($2::jsonb) || {column}, updated_at = now() \
             WHERE user_id = $1"
        );
        let res = sqlx::query(&sql)
            .bind(user_id)
            .bind(Json(entry))
            .execute(&self.db)
            .await
            .with_context(|| format!("prepend {column} entry"))?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_by_user(user_id).await
    }

    async fn remove_entry(
        &self,
        column: &'static str,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles SET
                {column} = COALESCE(
                    (SELECT jsonb_agg(e ORDER BY ord)
                     FROM jsonb_array_elements({column}) WITH ORDINALITY AS t(e, ord)
                     WHERE e->>'_id' <> $2),
                    '[]'::jsonb),
                updated_at = now()
            WHERE user_id = $1
            "#
        );
        let res = sqlx::query(&sql)
            .bind(user_id)
            .bind(entry_id.to_string())
            .execute(&self.db)
            .await
            .with_context(|| format!("remove {column} entry"))?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_by_user(user_id).await
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        self.fetch_by_user(user_id).await
    }

    async fn list(&self) -> anyhow::Result<Vec<Profile>> {
        let sql = format!("{SELECT_PROFILE} ORDER BY p.created_at");
        let rows = sqlx::query_as::<_, ProfileRow>(&sql)
            .fetch_all(&self.db)
            .await
            .context("list profiles")?;
        Ok(rows.into_iter().map(Profile::from).collect())
    }

    async fn create(
        &self,
        user_id: Uuid,
        fields: &ProfileFields,
    ) -> anyhow::Result<Option<Profile>> {
        let res = sqlx::query(
            r#"
            INSERT INTO profiles
                (id, user_id, company, location, website, bio, status, githubusername,
                 skills, social)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&fields.company)
        .bind(&fields.location)
        .bind(&fields.website)
        .bind(&fields.bio)
        .bind(&fields.status)
        .bind(&fields.githubusername)
        .bind(fields.skills.clone().unwrap_or_default())
        .bind(Json(&fields.social))
        .execute(&self.db)
        .await
        .context("insert profile")?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_by_user(user_id).await
    }

    async fn update(
        &self,
        user_id: Uuid,
        fields: &ProfileFields,
    ) -> anyhow::Result<Option<Profile>> {
        let res = sqlx::query(
            r#"
            UPDATE profiles SET
                company        = COALESCE($2, company),
                location       = COALESCE($3, location),
                website        = COALESCE($4, website),
                bio            = COALESCE($5, bio),
                status         = COALESCE($6, status),
                githubusername = COALESCE($7, githubusername),
                skills         = COALESCE($8, skills),
                social         = $9,
                updated_at     = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(&fields.company)
        .bind(&fields.location)
        .bind(&fields.website)
        .bind(&fields.bio)
        .bind(&fields.status)
        .bind(&fields.githubusername)
        .bind(&fields.skills)
        .bind(Json(&fields.social))
        .execute(&self.db)
        .await
        .context("update profile")?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_by_user(user_id).await
    }

    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: &Experience,
    ) -> anyhow::Result<Option<Profile>> {
        self.prepend_entry("experience", user_id, entry).await
    }

    async fn remove_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        self.remove_entry("experience", user_id, entry_id).await
    }

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: &Education,
    ) -> anyhow::Result<Option<Profile>> {
        self.prepend_entry("education", user_id, entry).await
    }

    async fn remove_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        self.remove_entry("education", user_id, entry_id).await
    }

    async fn delete_by_user(&self, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete profile")?;
        Ok(res.rows_affected() > 0)
    }
}
