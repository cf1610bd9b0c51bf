//! Contact form service
//!
//! Visitors request a math captcha, then submit the form together with the
//! captcha id and their answer. Challenges live in the moka cache with a TTL.
//! Every submission takes the challenge out of the cache. A wrong answer puts
//! it back until `MAX_CAPTCHA_ATTEMPTS` is reached. A successful submission
//! lands in the admin inbox as an unread message.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::{CacheLayer, MemoryCache};
use crate::config::ContactConfig;
use crate::models::{FieldErrors, Language, Message};
use crate::services::collection::{CollectionError, CollectionService};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const CAPTCHA_PREFIX: &str = "captcha:";
/// Wrong answers allowed before a challenge is thrown away
pub const MAX_CAPTCHA_ATTEMPTS: u32 = 3;

/// Error types for contact form operations
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("Captcha storage error: {0}")]
    Cache(#[from] anyhow::Error),
}

/// Stored answer of an issued captcha
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CaptchaAnswer {
    answer: u32,
    attempts: u32,
    issued_at: DateTime<Utc>,
}

/// Captcha handed to the visitor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Captcha {
    pub id: String,
    pub first: u32,
    pub second: u32,
    pub question: String,
    pub expires_in: u64,
}

/// Submitted contact form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub captcha_id: String,
    pub captcha: String,
    /// Hidden field; bots fill it in
    pub honeypot: Option<String>,
}

pub struct ContactService {
    cache: Arc<MemoryCache>,
    messages: Arc<CollectionService<Message>>,
    captcha_ttl: Duration,
    latency: Duration,
}

impl ContactService {
    pub fn new(
        cache: Arc<MemoryCache>,
        messages: Arc<CollectionService<Message>>,
        config: &ContactConfig,
        latency: Duration,
    ) -> Self {
        Self {
            cache,
            messages,
            captcha_ttl: Duration::from_secs(config.captcha_ttl_seconds),
            latency,
        }
    }

    /// Issue a new addition captcha with operands 0..=9
    pub async fn new_captcha(&self) -> Result<Captcha, ContactError> {
        let id = Uuid::new_v4();
        let bytes = Uuid::new_v4().into_bytes();
        let first = u32::from(bytes[0] % 10);
        let second = u32::from(bytes[1] % 10);

        self.cache
            .set(
                &captcha_key(&id.to_string()),
                &CaptchaAnswer {
                    answer: first + second,
                    attempts: 0,
                    issued_at: Utc::now(),
                },
                self.captcha_ttl,
            )
            .await?;

        Ok(Captcha {
            id: id.to_string(),
            first,
            second,
            question: format!("{} + {} = ?", first, second),
            expires_in: self.captcha_ttl.as_secs(),
        })
    }

    /// Validate and store a contact form submission
    pub async fn submit(&self, form: ContactForm, language: Language) -> Result<Message, ContactError> {
        validate_form(&form).map_err(ContactError::Validation)?;

        let key = captcha_key(form.captcha_id.trim());
        let challenge: Option<CaptchaAnswer> = self.cache.take(&key).await?;
        let given = form.captcha.trim().parse::<u32>().ok();

        match challenge {
            Some(challenge) if Some(challenge.answer) == given => {}
            Some(challenge) => {
                self.retry_later(&key, challenge).await?;
                return Err(wrong_captcha(language));
            }
            None => return Err(wrong_captcha(language)),
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let message = self
            .messages
            .create(Message::received(
                form.name.trim().to_string(),
                form.email.trim().to_string(),
                form.subject.trim().to_string(),
                form.message.trim().to_string(),
            ))
            .await?;

        tracing::info!("Contact message {} received from {}", message.id, message.email);
        Ok(message)
    }

    /// Put a wrongly answered challenge back for its remaining lifetime
    async fn retry_later(&self, key: &str, mut challenge: CaptchaAnswer) -> Result<(), ContactError> {
        challenge.attempts += 1;
        if challenge.attempts >= MAX_CAPTCHA_ATTEMPTS {
            tracing::debug!("Captcha {} discarded after {} wrong answers", key, challenge.attempts);
            return Ok(());
        }

        let elapsed = (Utc::now() - challenge.issued_at).to_std().unwrap_or_default();
        let remaining = self.captcha_ttl.saturating_sub(elapsed);
        if !remaining.is_zero() {
            self.cache.set(key, &challenge, remaining).await?;
        }
        Ok(())
    }
}

/// Loose `local@domain.tld` check shared with the contact settings form
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn wrong_captcha(language: Language) -> ContactError {
    let mut errors = FieldErrors::new();
    errors.add("captcha", incorrect_answer(language));
    ContactError::Validation(errors)
}

fn captcha_key(id: &str) -> String {
    format!("{}{}", CAPTCHA_PREFIX, id)
}

fn incorrect_answer(language: Language) -> &'static str {
    match language {
        Language::En => "Incorrect answer",
        Language::Ar => "الإجابة غير صحيحة",
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || c.is_whitespace()
        || ('\u{0600}'..='\u{06FF}').contains(&c)
        || matches!(c, '.' | ',' | '\'' | '-')
}

/// Field checks run before the captcha is looked at
pub fn validate_form(form: &ContactForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let name_len = form.name.chars().count();
    if name_len < 2 {
        errors.add("name", "Name must be at least 2 characters");
    } else if name_len > 100 {
        errors.add("name", "Name cannot exceed 100 characters");
    } else if !form.name.chars().all(is_name_char) {
        errors.add("name", "Name contains invalid characters");
    }

    if !is_valid_email(&form.email) {
        errors.add("email", "Please enter a valid email address");
    } else if form.email.chars().count() > 100 {
        errors.add("email", "Email cannot exceed 100 characters");
    }

    let subject_len = form.subject.chars().count();
    if subject_len < 3 {
        errors.add("subject", "Subject must be at least 3 characters");
    } else if subject_len > 200 {
        errors.add("subject", "Subject cannot exceed 200 characters");
    }

    let message_len = form.message.chars().count();
    if message_len < 10 {
        errors.add("message", "Message must be at least 10 characters");
    } else if message_len > 3000 {
        errors.add("message", "Message cannot exceed 3000 characters");
    }

    if form.captcha.is_empty() {
        errors.add("captcha", "Please solve the captcha");
    }

    if form.honeypot.as_deref().is_some_and(|h| !h.is_empty()) {
        errors.add("honeypot", "Spam detected");
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::test_store;
    use proptest::prelude::*;

    async fn service() -> (ContactService, Arc<CollectionService<Message>>) {
        let messages = Arc::new(CollectionService::new(test_store().await));
        let service = ContactService::new(
            Arc::new(MemoryCache::new()),
            messages.clone(),
            &ContactConfig::default(),
            Duration::ZERO,
        );
        (service, messages)
    }

    fn form(captcha: &Captcha, answer: u32) -> ContactForm {
        ContactForm {
            name: "Sara O'Neil".into(),
            email: "sara@example.com".into(),
            subject: "Project inquiry".into(),
            message: "I would like to discuss a website redesign.".into(),
            captcha_id: captcha.id.clone(),
            captcha: answer.to_string(),
            honeypot: Some(String::new()),
        }
    }

    #[tokio::test]
    async fn test_captcha_operands() {
        let (service, _) = service().await;
        for _ in 0..20 {
            let captcha = service.new_captcha().await.unwrap();
            assert!(captcha.first <= 9 && captcha.second <= 9);
            assert_eq!(
                captcha.question,
                format!("{} + {} = ?", captcha.first, captcha.second)
            );
        }
    }

    #[tokio::test]
    async fn test_submit_stores_unread_message() {
        let (service, messages) = service().await;
        let captcha = service.new_captcha().await.unwrap();

        let message = service
            .submit(form(&captcha, captcha.first + captcha.second), Language::En)
            .await
            .unwrap();

        assert!(!message.read);
        assert_eq!(message.sender, "Sara O'Neil");
        assert_eq!(messages.count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_wrong_answer_never_stores() {
        let (service, messages) = service().await;
        let captcha = service.new_captcha().await.unwrap();
        let wrong = captcha.first + captcha.second + 1;

        let err = service.submit(form(&captcha, wrong), Language::En).await.unwrap_err();
        let ContactError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.get("captcha"), Some("Incorrect answer"));
        assert_eq!(messages.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_wrong_answer_in_arabic() {
        let (service, _) = service().await;
        let captcha = service.new_captcha().await.unwrap();

        let err = service
            .submit(form(&captcha, 99), Language::Ar)
            .await
            .unwrap_err();
        let ContactError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.get("captcha"), Some("الإجابة غير صحيحة"));
    }

    #[tokio::test]
    async fn test_captcha_is_consumed() {
        let (service, messages) = service().await;
        let captcha = service.new_captcha().await.unwrap();
        let answer = captcha.first + captcha.second;

        service.submit(form(&captcha, answer), Language::En).await.unwrap();
        let replay = service.submit(form(&captcha, answer), Language::En).await;

        assert!(matches!(replay, Err(ContactError::Validation(_))));
        assert_eq!(messages.count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_captcha_retry_then_discard() {
        let (service, messages) = service().await;
        let captcha = service.new_captcha().await.unwrap();
        let answer = captcha.first + captcha.second;

        // a wrong answer can be corrected
        assert!(service.submit(form(&captcha, answer + 1), Language::En).await.is_err());
        service.submit(form(&captcha, answer), Language::En).await.unwrap();
        assert_eq!(messages.count().await.unwrap(), 6);

        // too many wrong answers burn the challenge
        let captcha = service.new_captcha().await.unwrap();
        let answer = captcha.first + captcha.second;
        for _ in 0..MAX_CAPTCHA_ATTEMPTS {
            assert!(service.submit(form(&captcha, answer + 1), Language::En).await.is_err());
        }
        let late = service.submit(form(&captcha, answer), Language::En).await;
        assert!(matches!(late, Err(ContactError::Validation(f)) if f.contains("captcha")));
        assert_eq!(messages.count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_unknown_captcha_id() {
        let (service, _) = service().await;
        let mut submission = form(
            &Captcha {
                id: "missing".into(),
                first: 1,
                second: 1,
                question: String::new(),
                expires_in: 0,
            },
            2,
        );
        submission.captcha_id = "missing".into();

        let err = service.submit(submission, Language::En).await.unwrap_err();
        assert!(matches!(err, ContactError::Validation(f) if f.contains("captcha")));
    }

    #[test]
    fn test_field_rules() {
        let mut bad = ContactForm {
            name: "J".into(),
            email: "not-an-email".into(),
            subject: "Hi".into(),
            message: "short".into(),
            captcha: String::new(),
            honeypot: Some("http://spam".into()),
            ..Default::default()
        };
        let errors = validate_form(&bad).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
        assert!(errors.contains("email"));
        assert!(errors.contains("subject"));
        assert!(errors.contains("message"));
        assert_eq!(errors.get("captcha"), Some("Please solve the captcha"));
        assert_eq!(errors.get("honeypot"), Some("Spam detected"));

        bad.name = "Robot 3000".into();
        let errors = validate_form(&bad).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name contains invalid characters"));
    }

    #[test]
    fn test_arabic_name_accepted() {
        let form = ContactForm {
            name: "أحمد جمال".into(),
            email: "ahmed@example.com".into(),
            subject: "مرحبا بك".into(),
            message: "رسالة تجريبية طويلة بما يكفي".into(),
            captcha: "4".into(),
            ..Default::default()
        };
        assert!(validate_form(&form).is_ok());
    }

    #[test]
    fn test_length_limits() {
        let form = ContactForm {
            name: "a".repeat(101),
            email: format!("{}@example.com", "a".repeat(95)),
            subject: "s".repeat(201),
            message: "m".repeat(3001),
            captcha: "1".into(),
            ..Default::default()
        };
        let errors = validate_form(&form).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name cannot exceed 100 characters"));
        assert_eq!(errors.get("email"), Some("Email cannot exceed 100 characters"));
        assert_eq!(errors.get("subject"), Some("Subject cannot exceed 200 characters"));
        assert_eq!(errors.get("message"), Some("Message cannot exceed 3000 characters"));
    }

    proptest! {
        #[test]
        fn prop_any_wrong_answer_is_rejected(offset in 1u32..50) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let (service, messages) = service().await;
                let captcha = service.new_captcha().await.unwrap();
                let wrong = captcha.first + captcha.second + offset;

                let result = service.submit(form(&captcha, wrong), Language::En).await;
                prop_assert!(matches!(result, Err(ContactError::Validation(f)) if f.contains("captcha")));
                prop_assert_eq!(messages.count().await.unwrap(), 5);
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
