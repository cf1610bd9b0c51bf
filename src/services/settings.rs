//! Settings service
//!
//! Site settings, the owner's profile, visitor preferences, CV layout and the
//! contact destination. Updates are partial: the patch is merged into the
//! current snapshot and the result is saved wholesale.

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{
    ContactSettings, CvSettings, FieldErrors, Language, Preferences, ProfileData, SiteSettings,
    Theme, CV_FORMATS,
};
use crate::services::contact::is_valid_email;
use crate::services::store::{keys, Store, StoreError};

/// Settings service errors
#[derive(Debug, Error)]
pub enum SettingsServiceError {
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct SettingsService {
    store: Arc<Store>,
}

impl SettingsService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn site_settings(&self) -> Result<SiteSettings, SettingsServiceError> {
        Ok(self.store.load_or_default(keys::SITE_SETTINGS).await?)
    }

    /// Merge `patch` into the site settings and save
    pub async fn update_site_settings(&self, patch: &Value) -> Result<SiteSettings, SettingsServiceError> {
        let current = self.site_settings().await?;
        let updated: SiteSettings = apply_patch(&current, patch)?;

        let mut errors = FieldErrors::new();
        errors.require("siteName", &updated.site_name, "Site name is required");
        errors.into_result().map_err(SettingsServiceError::Validation)?;

        self.store.save(keys::SITE_SETTINGS, &updated).await?;
        tracing::info!("Site settings updated");
        Ok(updated)
    }

    /// Whether public content routes should answer with 503
    pub async fn maintenance_mode(&self) -> Result<bool, SettingsServiceError> {
        Ok(self.site_settings().await?.maintenance_mode)
    }

    pub async fn profile(&self) -> Result<ProfileData, SettingsServiceError> {
        Ok(self.store.load_or_default(keys::PROFILE_DATA).await?)
    }

    /// Merge `patch` into the profile. `socialMedia` merges per network;
    /// a `null` network removes it.
    pub async fn update_profile(&self, patch: &Value) -> Result<ProfileData, SettingsServiceError> {
        let current = self.profile().await?;
        let updated: ProfileData = apply_patch(&current, patch)?;

        let mut errors = FieldErrors::new();
        errors.require("name", &updated.name, "Name is required");
        if !is_valid_email(&updated.email) {
            errors.add("email", "Please enter a valid email address");
        }
        errors.into_result().map_err(SettingsServiceError::Validation)?;

        self.store.save(keys::PROFILE_DATA, &updated).await?;
        Ok(updated)
    }

    pub async fn preferences(&self) -> Result<Preferences, SettingsServiceError> {
        let language = self.store.load::<Language>(keys::LANGUAGE).await?;
        let theme = self.store.load::<Theme>(keys::THEME).await?;
        Ok(Preferences {
            language: language.unwrap_or_default(),
            theme: theme.unwrap_or_default(),
        })
    }

    /// Save whichever of language and theme is given
    pub async fn update_preferences(
        &self,
        language: Option<Language>,
        theme: Option<Theme>,
    ) -> Result<Preferences, SettingsServiceError> {
        if let Some(language) = language {
            self.store.save(keys::LANGUAGE, &language).await?;
        }
        if let Some(theme) = theme {
            self.store.save(keys::THEME, &theme).await?;
        }
        self.preferences().await
    }

    pub async fn cv_settings(&self) -> Result<CvSettings, SettingsServiceError> {
        Ok(self.store.load_or_default(keys::CV_SETTINGS).await?)
    }

    pub async fn update_cv_settings(&self, patch: &Value) -> Result<CvSettings, SettingsServiceError> {
        let current = self.cv_settings().await?;
        let updated: CvSettings = apply_patch(&current, patch)?;

        if !CV_FORMATS.contains(&updated.format.as_str()) {
            let mut errors = FieldErrors::new();
            errors.add(
                "format",
                format!("Format must be one of: {}", CV_FORMATS.join(", ")),
            );
            return Err(SettingsServiceError::Validation(errors));
        }

        self.store.save(keys::CV_SETTINGS, &updated).await?;
        Ok(updated)
    }

    /// Flip one CV section on or off
    pub async fn toggle_cv_section(&self, section: &str) -> Result<CvSettings, SettingsServiceError> {
        let mut settings = self.cv_settings().await?;
        settings
            .sections
            .toggle(section)
            .ok_or_else(|| SettingsServiceError::InvalidValue(format!("Unknown CV section: {}", section)))?;

        self.store.save(keys::CV_SETTINGS, &settings).await?;
        Ok(settings)
    }

    pub async fn contact_settings(&self) -> Result<ContactSettings, SettingsServiceError> {
        Ok(self.store.load_or_default(keys::CONTACT_SETTINGS).await?)
    }

    pub async fn update_contact_settings(
        &self,
        settings: ContactSettings,
    ) -> Result<ContactSettings, SettingsServiceError> {
        if !is_valid_email(settings.contact_email.trim()) {
            let mut errors = FieldErrors::new();
            errors.add("contactEmail", "Please enter a valid email address");
            return Err(SettingsServiceError::Validation(errors));
        }

        let settings = ContactSettings {
            contact_email: settings.contact_email.trim().to_string(),
        };
        self.store.save(keys::CONTACT_SETTINGS, &settings).await?;
        Ok(settings)
    }
}

/// Merge `patch` into the JSON form of `current` and read it back as `T`
fn apply_patch<T>(current: &T, patch: &Value) -> Result<T, SettingsServiceError>
where
    T: Serialize + DeserializeOwned,
{
    if !patch.is_object() {
        return Err(SettingsServiceError::InvalidValue(
            "Settings update must be a JSON object".to_string(),
        ));
    }

    let mut value = serde_json::to_value(current).map_err(StoreError::from)?;
    merge(&mut value, patch);
    serde_json::from_value(value).map_err(|e| SettingsServiceError::InvalidValue(e.to_string()))
}

/// JSON merge patch: objects merge recursively, `null` removes a key
fn merge(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                merge(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

static TRANSLATIONS: Lazy<Value> = Lazy::new(|| {
    json!({
        "en": {
            "nav": {
                "home": "Home",
                "cv": "Resume",
                "portfolio": "Portfolio",
                "apps": "Applications",
                "training": "Training",
                "blog": "Blog",
                "contact": "Contact",
                "about": "About Me",
                "achievements": "Achievements",
                "literature": "Literature",
                "press": "Press",
                "resources": "Resources"
            },
            "home": {
                "headline": "Ahmed Jamal",
                "subheadline": "Digital Professional",
                "cta": "View My Work",
                "bio": "Expert in social media, graphic design, web development, and training"
            },
            "footer": {
                "rights": "All Rights Reserved",
                "madeWith": "Made with passion"
            }
        },
        "ar": {
            "nav": {
                "home": "الرئيسية",
                "cv": "السيرة الذاتية",
                "portfolio": "الأعمال",
                "apps": "التطبيقات",
                "training": "التدريب",
                "blog": "المدونة",
                "contact": "التواصل",
                "about": "عني",
                "achievements": "الإنجازات",
                "literature": "كتابات",
                "press": "في الإعلام",
                "resources": "الملفات"
            },
            "home": {
                "headline": "أحمد جمال",
                "subheadline": "محترف رقمي",
                "cta": "استعرض أعمالي",
                "bio": "خبير في وسائل التواصل الاجتماعي والتصميم الجرافيكي وتطوير الويب والتدريب"
            },
            "footer": {
                "rights": "جميع الحقوق محفوظة",
                "madeWith": "صنع بشغف"
            }
        }
    })
});

/// Static interface strings for `language`
pub fn translations(language: Language) -> &'static Value {
    &TRANSLATIONS[language.as_str()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::test_store;

    async fn service() -> SettingsService {
        SettingsService::new(test_store().await)
    }

    #[tokio::test]
    async fn test_defaults_when_absent() {
        let service = service().await;
        let settings = service.site_settings().await.unwrap();
        assert_eq!(settings, SiteSettings::default());
        assert!(!service.maintenance_mode().await.unwrap());
    }

    #[tokio::test]
    async fn test_site_settings_survive_reload() {
        let store = test_store().await;
        let service = SettingsService::new(store.clone());

        service
            .update_site_settings(&json!({ "siteName": "Studio Jamal", "maintenanceMode": true }))
            .await
            .unwrap();

        let reloaded = SettingsService::new(store.clone());
        let settings = reloaded.site_settings().await.unwrap();
        assert_eq!(settings.site_name, "Studio Jamal");
        assert!(settings.maintenance_mode);
        assert_eq!(settings.site_author, "Ahmed Jamal");

        let raw = store.load::<Value>(keys::SITE_SETTINGS).await.unwrap().unwrap();
        assert_eq!(raw["siteName"], "Studio Jamal");
    }

    #[tokio::test]
    async fn test_blank_site_name_rejected() {
        let service = service().await;
        let err = service
            .update_site_settings(&json!({ "siteName": "  " }))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsServiceError::Validation(f) if f.contains("siteName")));
    }

    #[tokio::test]
    async fn test_wrong_type_rejected() {
        let service = service().await;
        let err = service
            .update_site_settings(&json!({ "maintenanceMode": "yes" }))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsServiceError::InvalidValue(_)));

        let err = service.update_site_settings(&json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, SettingsServiceError::InvalidValue(_)));
    }

    #[tokio::test]
    async fn test_social_media_merges_per_network() {
        let service = service().await;

        service
            .update_profile(&json!({
                "socialMedia": { "twitter": "https://twitter.com/ahmed", "github": "https://github.com/ahmed" }
            }))
            .await
            .unwrap();
        let profile = service
            .update_profile(&json!({
                "phone": "+966 500 000 000",
                "socialMedia": { "linkedin": "https://linkedin.com/in/ahmed", "github": null }
            }))
            .await
            .unwrap();

        assert_eq!(profile.phone, "+966 500 000 000");
        assert_eq!(profile.social_media.len(), 2);
        assert!(profile.social_media.contains_key("twitter"));
        assert!(profile.social_media.contains_key("linkedin"));
        assert!(!profile.social_media.contains_key("github"));
    }

    #[tokio::test]
    async fn test_profile_email_validated() {
        let service = service().await;
        let err = service
            .update_profile(&json!({ "email": "nope" }))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsServiceError::Validation(f) if f.contains("email")));
    }

    #[tokio::test]
    async fn test_preferences() {
        let service = service().await;
        let prefs = service.preferences().await.unwrap();
        assert_eq!(prefs.language, Language::En);
        assert_eq!(prefs.direction(), "ltr");

        let prefs = service
            .update_preferences(Some(Language::Ar), None)
            .await
            .unwrap();
        assert_eq!(prefs.direction(), "rtl");
        assert_eq!(prefs.theme, Theme::Light);

        let prefs = service.update_preferences(None, Some(Theme::Dark)).await.unwrap();
        assert_eq!(prefs.language, Language::Ar);
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_cv_settings() {
        let service = service().await;

        let cv = service
            .update_cv_settings(&json!({ "format": "classic", "headline": "Designer" }))
            .await
            .unwrap();
        assert_eq!(cv.format, "classic");
        assert!(cv.sections.summary);

        let err = service
            .update_cv_settings(&json!({ "format": "fancy" }))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsServiceError::Validation(_)));

        let cv = service.toggle_cv_section("references").await.unwrap();
        assert!(cv.sections.references);
        assert!(service.cv_settings().await.unwrap().sections.references);

        let err = service.toggle_cv_section("hobbies").await.unwrap_err();
        assert!(matches!(err, SettingsServiceError::InvalidValue(_)));
    }

    #[tokio::test]
    async fn test_contact_settings() {
        let service = service().await;
        let saved = service
            .update_contact_settings(ContactSettings {
                contact_email: " hello@ahmedjamal.com ".into(),
            })
            .await
            .unwrap();
        assert_eq!(saved.contact_email, "hello@ahmedjamal.com");

        let err = service
            .update_contact_settings(ContactSettings {
                contact_email: "broken".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsServiceError::Validation(_)));
    }

    #[test]
    fn test_translations() {
        assert_eq!(translations(Language::En)["nav"]["cv"], "Resume");
        assert_eq!(translations(Language::Ar)["footer"]["madeWith"], "صنع بشغف");
    }

    #[test]
    fn test_merge_nested() {
        let mut target = json!({ "a": 1, "b": { "c": 2, "d": 3 } });
        merge(&mut target, &json!({ "b": { "d": null, "e": 4 }, "f": "x" }));
        assert_eq!(target, json!({ "a": 1, "b": { "c": 2, "e": 4 }, "f": "x" }));
    }
}
