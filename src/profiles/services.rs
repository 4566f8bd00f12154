use time::Date;
use uuid::Uuid;

use crate::{
    error::ApiError,
    profiles::{
        dto::{EducationRequest, ExperienceRequest, ProfileRequest},
        repo_types::{Education, Entry, Experience, Profile, ProfileFields, Social},
    },
    validation::Validator,
};

/// Splits a comma-separated skills input into trimmed, non-empty entries.
pub fn parse_skills(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validates a profile submission and turns it into a partial update.
pub fn build_profile_fields(req: ProfileRequest) -> Result<ProfileFields, ApiError> {
    let mut v = Validator::new();
    v.required("status", req.status.as_deref(), "Status is required");
    v.required("skills", req.skills.as_deref(), "Skills is required");
    v.finish()?;

    Ok(ProfileFields {
        company: supplied(req.company),
        location: supplied(req.location),
        website: supplied(req.website),
        bio: supplied(req.bio),
        status: supplied(req.status),
        githubusername: supplied(req.githubusername),
        skills: supplied(req.skills).map(|s| parse_skills(&s)),
        social: Social {
            youtube: supplied(req.youtube),
            twitter: supplied(req.twitter),
            linkedin: supplied(req.linkedin),
            instagram: supplied(req.instagram),
            facebook: supplied(req.facebook),
        },
    })
}

/// Applies a partial update in place: supplied fields overwrite, the rest are
/// kept, and `social` is replaced wholesale.
pub fn merge_fields(profile: &mut Profile, fields: &ProfileFields) {
    fn set(slot: &mut Option<String>, value: &Option<String>) {
        if let Some(v) = value {
            *slot = Some(v.clone());
        }
    }
    set(&mut profile.company, &fields.company);
    set(&mut profile.location, &fields.location);
    set(&mut profile.website, &fields.website);
    set(&mut profile.bio, &fields.bio);
    set(&mut profile.status, &fields.status);
    set(&mut profile.githubusername, &fields.githubusername);
    if let Some(skills) = &fields.skills {
        profile.skills = skills.clone();
    }
    profile.social = fields.social.clone();
}

/// Accepts `YYYY-MM-DD`, or a full timestamp whose date part is used.
pub fn parse_date(input: &str) -> Option<Date> {
    let day = input.trim().split('T').next()?;
    Date::parse(day, time::macros::format_description!("[year]-[month]-[day]")).ok()
}

fn optional_date(
    v: &mut Validator,
    param: &'static str,
    value: Option<&str>,
    msg: &str,
) -> Option<Date> {
    let raw = value.filter(|s| !s.trim().is_empty())?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        v.push(param, msg);
    }
    parsed
}

pub fn build_experience(req: ExperienceRequest) -> Result<Experience, ApiError> {
    let mut v = Validator::new();
    v.required("title", req.title.as_deref(), "Title is required");
    v.required("company", req.company.as_deref(), "Company is required");
    v.required("from", req.from.as_deref(), "From date is required");
    let from = optional_date(&mut v, "from", req.from.as_deref(), "From must be a date");
    let to = optional_date(&mut v, "to", req.to.as_deref(), "To must be a date");
    v.finish()?;

    let (Some(title), Some(company), Some(from)) = (req.title, req.company, from) else {
        return Err(ApiError::Internal(anyhow::anyhow!("validated fields missing")));
    };
    Ok(Experience {
        id: Uuid::new_v4(),
        title,
        company,
        location: supplied(req.location),
        from,
        to,
        current: req.current,
        description: supplied(req.description),
    })
}

pub fn build_education(req: EducationRequest) -> Result<Education, ApiError> {
    let mut v = Validator::new();
    v.required("school", req.school.as_deref(), "School is required");
    v.required("degree", req.degree.as_deref(), "Degree is required");
    v.required(
        "fieldofstudy",
        req.fieldofstudy.as_deref(),
        "Field of study is required",
    );
    v.required("from", req.from.as_deref(), "From date is required");
    let from = optional_date(&mut v, "from", req.from.as_deref(), "From must be a date");
    let to = optional_date(&mut v, "to", req.to.as_deref(), "To must be a date");
    v.finish()?;

    let (Some(school), Some(degree), Some(fieldofstudy), Some(from)) =
        (req.school, req.degree, req.fieldofstudy, from)
    else {
        return Err(ApiError::Internal(anyhow::anyhow!("validated fields missing")));
    };
    Ok(Education {
        id: Uuid::new_v4(),
        school,
        degree,
        fieldofstudy,
        from,
        to,
        current: req.current,
        description: supplied(req.description),
    })
}

/// Most recent first.
pub fn prepend_entry<T>(list: &mut Vec<T>, entry: T) {
    list.insert(0, entry);
}

/// Removes the entry with `id`. An unknown id leaves the list unchanged;
/// returns whether something was removed.
pub fn remove_entry<T: Entry>(list: &mut Vec<T>, id: Uuid) -> bool {
    match list.iter().position(|e| e.entry_id() == id) {
        Some(idx) => {
            list.remove(idx);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::repo_types::ProfileOwner;
    use time::{macros::date, OffsetDateTime};

    fn empty_profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user: ProfileOwner {
                id: Uuid::new_v4(),
                name: "Ada".into(),
                avatar: "https://www.gravatar.com/avatar/x".into(),
            },
            company: None,
            location: None,
            website: None,
            bio: None,
            status: None,
            githubusername: None,
            skills: vec![],
            social: Social::default(),
            experience: vec![],
            education: vec![],
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn experience(title: &str) -> Experience {
        build_experience(ExperienceRequest {
            title: Some(title.into()),
            company: Some("Acme".into()),
            from: Some("2020-01-01".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn skills_are_split_and_trimmed() {
        assert_eq!(parse_skills("a, b ,c"), ["a", "b", "c"]);
        assert_eq!(parse_skills("rust,, go ,"), ["rust", "go"]);
    }

    #[test]
    fn status_and_skills_are_required() {
        let Err(ApiError::Validation(errors)) = build_profile_fields(ProfileRequest::default())
        else {
            panic!("expected validation error");
        };
        let params: Vec<_> = errors.iter().map(|e| e.param).collect();
        assert_eq!(params, ["status", "skills"]);
    }

    #[test]
    fn blank_optional_fields_count_as_unsupplied() {
        let fields = build_profile_fields(ProfileRequest {
            status: Some("Developer".into()),
            skills: Some("rust".into()),
            company: Some("   ".into()),
            twitter: Some("".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(fields.company, None);
        assert_eq!(fields.social, Social::default());
    }

    #[test]
    fn merge_keeps_unspecified_fields_and_replaces_social() {
        let mut profile = empty_profile();
        let first = build_profile_fields(ProfileRequest {
            status: Some("Developer".into()),
            skills: Some("rust, sql".into()),
            company: Some("Acme".into()),
            bio: Some("hello".into()),
            twitter: Some("https://twitter.com/ada".into()),
            ..Default::default()
        })
        .unwrap();
        merge_fields(&mut profile, &first);
        merge_fields(&mut profile, &first);

        let third = ProfileFields {
            status: Some("Senior Developer".into()),
            ..Default::default()
        };
        merge_fields(&mut profile, &third);

        assert_eq!(profile.status.as_deref(), Some("Senior Developer"));
        assert_eq!(profile.company.as_deref(), Some("Acme"));
        assert_eq!(profile.bio.as_deref(), Some("hello"));
        assert_eq!(profile.skills, ["rust", "sql"]);
        assert_eq!(profile.social, Social::default());
    }

    #[test]
    fn experience_is_prepended() {
        let mut profile = empty_profile();
        let e1 = experience("first");
        let e2 = experience("second");
        prepend_entry(&mut profile.experience, e1.clone());
        prepend_entry(&mut profile.experience, e2.clone());
        assert_eq!(profile.experience, [e2, e1]);
    }

    #[test]
    fn removing_unknown_entry_is_a_noop() {
        let mut list = vec![experience("a"), experience("b")];
        let before = list.clone();
        assert!(!remove_entry(&mut list, Uuid::new_v4()));
        assert_eq!(list, before);
    }

    #[test]
    fn removing_known_entry_removes_only_it() {
        let mut list = vec![experience("a"), experience("b"), experience("c")];
        let target = list[1].id;
        assert!(remove_entry(&mut list, target));
        let titles: Vec<_> = list.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["a", "c"]);
    }

    #[test]
    fn experience_validation_lists_every_missing_field() {
        let Err(ApiError::Validation(errors)) = build_experience(ExperienceRequest::default())
        else {
            panic!("expected validation error");
        };
        let params: Vec<_> = errors.iter().map(|e| e.param).collect();
        assert_eq!(params, ["title", "company", "from"]);
    }

    #[test]
    fn education_requires_school_degree_field_and_from() {
        let Err(ApiError::Validation(errors)) = build_education(EducationRequest {
            school: Some("MIT".into()),
            from: Some("yesterday".into()),
            ..Default::default()
        }) else {
            panic!("expected validation error");
        };
        let params: Vec<_> = errors.iter().map(|e| e.param).collect();
        assert_eq!(params, ["degree", "fieldofstudy", "from"]);
    }

    #[test]
    fn dates_accept_plain_and_timestamp_forms() {
        assert_eq!(parse_date("2021-03-04"), Some(date!(2021 - 03 - 04)));
        assert_eq!(parse_date("2021-03-04T00:00:00.000Z"), Some(date!(2021 - 03 - 04)));
        assert_eq!(parse_date("03/04/2021"), None);
    }

    #[test]
    fn entry_json_uses_document_ids_and_plain_dates() {
        let e = experience("Engineer");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["_id"], e.id.to_string());
        assert_eq!(json["from"], "2020-01-01");
        assert!(json["to"].is_null());
        assert_eq!(json["current"], false);
    }
}
