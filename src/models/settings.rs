//! Site configuration snapshots
//!
//! Site settings, the owner's profile, visitor preferences, CV layout and the
//! contact destination. All have defaults so a fresh store renders a complete
//! site.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Global site settings (`site-settings`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    pub site_name: String,
    pub site_description: String,
    pub site_author: String,
    pub maintenance_mode: bool,
    pub favicon: String,
    pub site_language: Language,
    pub site_theme: Theme,
    pub logo_url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Ahmed Jamal - Portfolio & Blog".to_string(),
            site_description: "Personal portfolio and blog showcasing my work and thoughts."
                .to_string(),
            site_author: "Ahmed Jamal".to_string(),
            maintenance_mode: false,
            favicon: "/favicon.ico".to_string(),
            site_language: Language::En,
            site_theme: Theme::Light,
            logo_url: String::new(),
        }
    }
}

/// The site owner's public profile (`profile-data`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileData {
    pub name: String,
    pub name_ar: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub bio_ar: String,
    pub position: String,
    pub position_ar: String,
    pub avatar: String,
    /// Network name to profile URL
    pub social_media: BTreeMap<String, String>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            name: "Ahmed Jamal".to_string(),
            name_ar: "أحمد جمال".to_string(),
            email: "contact@ahmedjamal.com".to_string(),
            phone: "+123 456 7890".to_string(),
            location: "Riyadh, Saudi Arabia".to_string(),
            bio: "Digital professional with expertise in social media, graphic design, web development, and training.".to_string(),
            bio_ar: "محترف رقمي متخصص في وسائل التواصل الاجتماعي، التصميم الجرافيكي، تطوير الويب، والتدريب.".to_string(),
            position: "Digital Professional".to_string(),
            position_ar: "محترف رقمي".to_string(),
            avatar: "/placeholder.svg".to_string(),
            social_media: BTreeMap::new(),
        }
    }
}

/// Interface language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    /// Text direction: Arabic is right-to-left
    pub fn direction(&self) -> &'static str {
        match self {
            Language::En => "ltr",
            Language::Ar => "rtl",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            _ => Err(anyhow::anyhow!("Unsupported language: {}", s)),
        }
    }
}

/// Color theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Visitor preferences (`language` and `theme` keys)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub language: Language,
    pub theme: Theme,
}

impl Preferences {
    pub fn direction(&self) -> &'static str {
        self.language.direction()
    }
}

/// Which CV sections are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvSections {
    pub summary: bool,
    pub experience: bool,
    pub education: bool,
    pub skills: bool,
    pub achievements: bool,
    pub languages: bool,
    pub references: bool,
}

impl Default for CvSections {
    fn default() -> Self {
        Self {
            summary: true,
            experience: true,
            education: true,
            skills: true,
            achievements: true,
            languages: true,
            references: false,
        }
    }
}

impl CvSections {
    /// Flip one section by name. Returns the new state, or `None` for an
    /// unknown section.
    pub fn toggle(&mut self, section: &str) -> Option<bool> {
        let flag = match section {
            "summary" => &mut self.summary,
            "experience" => &mut self.experience,
            "education" => &mut self.education,
            "skills" => &mut self.skills,
            "achievements" => &mut self.achievements,
            "languages" => &mut self.languages,
            "references" => &mut self.references,
            _ => return None,
        };
        *flag = !*flag;
        Some(*flag)
    }
}

/// CV page layout (`cv-settings`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvSettings {
    /// `modern`, `classic` or `minimal`
    pub format: String,
    pub headline: String,
    pub sections: CvSections,
}

impl Default for CvSettings {
    fn default() -> Self {
        Self {
            format: "modern".to_string(),
            headline: "Digital Professional".to_string(),
            sections: CvSections::default(),
        }
    }
}

pub const CV_FORMATS: &[&str] = &["modern", "classic", "minimal"];

/// Contact form destination (`contact-settings`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactSettings {
    pub contact_email: String,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            contact_email: "contact@ahmedjamal.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_settings_defaults() {
        let settings = SiteSettings::default();
        assert_eq!(settings.site_name, "Ahmed Jamal - Portfolio & Blog");
        assert!(!settings.maintenance_mode);
        assert_eq!(settings.favicon, "/favicon.ico");
    }

    #[test]
    fn test_partial_settings_json_keeps_defaults() {
        let settings: SiteSettings =
            serde_json::from_str(r#"{"siteName":"My Site","siteTheme":"dark"}"#).unwrap();
        assert_eq!(settings.site_name, "My Site");
        assert_eq!(settings.site_theme, Theme::Dark);
        assert_eq!(settings.site_language, Language::En);
    }

    #[test]
    fn test_language_direction() {
        assert_eq!(Language::Ar.direction(), "rtl");
        assert_eq!(Language::En.direction(), "ltr");
        assert_eq!("AR".parse::<Language>().unwrap(), Language::Ar);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn test_cv_section_toggle() {
        let mut sections = CvSections::default();
        assert_eq!(sections.toggle("references"), Some(true));
        assert_eq!(sections.toggle("summary"), Some(false));
        assert_eq!(sections.toggle("hobbies"), None);
        assert!(sections.references);
        assert!(!sections.summary);
    }

    #[test]
    fn test_profile_defaults_include_arabic() {
        let profile = ProfileData::default();
        assert_eq!(profile.name_ar, "أحمد جمال");
        assert_eq!(profile.position_ar, "محترف رقمي");
        assert!(profile.social_media.is_empty());
    }
}
