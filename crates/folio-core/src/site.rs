use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Site content compiled into the binary, used when no override file is set.
const BUILTIN_SITE_JSON: &str = include_str!("../content/site.json");

/// Radar score for a skill category that declares no proficiency.
pub const DEFAULT_PROFICIENCY: u8 = 80;

/// Static portfolio content: profile, biography, skills, and projects.
///
/// Loaded once at startup and shared read-only behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    pub profile: Profile,
    pub bio: Vec<String>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub skill_categories: Vec<SkillCategory>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub headline: String,
    #[serde(default)]
    pub subheadline: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    External,
    Mailto,
    Download,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: String,
    pub label: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: String,
    pub title: String,
    pub skills: Vec<String>,
    /// 0-100 score plotted on the skills radar.
    pub proficiency: Option<u8>,
}

impl SkillCategory {
    pub fn radar_score(&self) -> u8 {
        self.proficiency.unwrap_or(DEFAULT_PROFICIENCY)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub short_tagline: String,
    pub impact_statement: String,
    pub problem: String,
    pub approach: String,
    pub results: String,
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Lower is more prominent.
    pub priority: u32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub links: ProjectLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<ProjectAssets>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectLinks {
    pub github: Option<String>,
    pub demo: Option<String>,
    pub writeup: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectAssets {
    pub thumbnail: Option<String>,
    pub banner: Option<String>,
    pub diagram: Option<String>,
    pub sequence_frames_prefix: Option<String>,
}

impl SiteContent {
    /// Parse the content document compiled into the crate.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_json(BUILTIN_SITE_JSON)
    }

    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load from `path` when given, otherwise fall back to [`Self::builtin`].
    pub fn load(path: Option<&str>) -> Result<Self, CoreError> {
        match path {
            Some(path) => {
                let raw =
                    std::fs::read_to_string(path).map_err(|source| CoreError::SiteContentIo {
                        path: path.to_string(),
                        source,
                    })?;
                Self::from_json(&raw)
            }
            None => Self::builtin(),
        }
    }

    /// Featured projects in declaration order.
    pub fn featured_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| p.is_featured)
    }

    /// All projects, most prominent first. Ties keep declaration order.
    pub fn projects_by_priority(&self) -> Vec<&Project> {
        let mut ordered: Vec<&Project> = self.projects.iter().collect();
        ordered.sort_by_key(|p| p.priority);
        ordered
    }

    pub fn social_link(&self, id: &str) -> Option<&SocialLink> {
        self.social_links.iter().find(|l| l.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_content_parses() {
        let site = SiteContent::builtin().expect("builtin site content");
        assert_eq!(site.profile.name, "Sammy Cayo");
        assert!(!site.bio.is_empty());
        assert_eq!(site.skill_categories.len(), 6);
        assert_eq!(site.featured_projects().count(), 4);
    }

    #[test]
    fn projects_by_priority_is_ascending() {
        let mut site = SiteContent::builtin().expect("builtin site content");
        site.projects.reverse();
        let priorities: Vec<u32> = site
            .projects_by_priority()
            .iter()
            .map(|p| p.priority)
            .collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn radar_score_defaults_when_unset() {
        let category = SkillCategory {
            id: "x".to_string(),
            title: "X".to_string(),
            skills: vec![],
            proficiency: None,
        };
        assert_eq!(category.radar_score(), DEFAULT_PROFICIENCY);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SiteContent::load(Some("/nonexistent/folio-site.json")).unwrap_err();
        assert!(matches!(err, CoreError::SiteContentIo { .. }));
    }

    #[test]
    fn social_link_lookup_by_id() {
        let site = SiteContent::builtin().expect("builtin site content");
        let linkedin = site.social_link("linkedin").expect("linkedin link");
        assert_eq!(linkedin.kind, LinkKind::External);
        assert!(site.social_link("myspace").is_none());
    }
}
