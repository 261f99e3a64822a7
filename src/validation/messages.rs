//! Validation message catalogs

use serde::{Deserialize, Serialize};

use crate::values::number_value;

/// Language of generated validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Tr,
    En,
}

/// Kind of validation failure
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Required,
    ExpectedString,
    ExpectedBoolean,
    InvalidEmail,
    InvalidPhone,
    InvalidUrl,
    InvalidDate,
    NotANumber,
    TooShort(f64),
    TooLong(f64),
    TooSmall(f64),
    TooLarge(f64),
    PatternMismatch,
    InvalidOption,
}

impl Message {
    fn template(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Tr => match self {
                Message::Required => "{label} zorunludur",
                Message::ExpectedString => "{label} metin olmalıdır",
                Message::ExpectedBoolean => "{label} işaretli ya da işaretsiz olmalıdır",
                Message::InvalidEmail => "{label} için geçerli bir e-posta adresi giriniz",
                Message::InvalidPhone => "{label} için geçerli bir telefon numarası giriniz",
                Message::InvalidUrl => "{label} için geçerli bir URL giriniz",
                Message::InvalidDate => "{label} için geçerli bir tarih giriniz",
                Message::NotANumber => "{label} bir sayı olmalıdır",
                Message::TooShort(_) => "{label} en az {bound} karakter olmalıdır",
                Message::TooLong(_) => "{label} en fazla {bound} karakter olmalıdır",
                Message::TooSmall(_) => "{label} en az {bound} olmalıdır",
                Message::TooLarge(_) => "{label} en fazla {bound} olabilir",
                Message::PatternMismatch => "{label} geçersiz formatta",
                Message::InvalidOption => "{label} için geçersiz bir seçim yapıldı",
            },
            Locale::En => match self {
                Message::Required => "{label} is required",
                Message::ExpectedString => "{label} must be text",
                Message::ExpectedBoolean => "{label} must be checked or unchecked",
                Message::InvalidEmail => "{label} must be a valid email address",
                Message::InvalidPhone => "{label} must be a valid phone number",
                Message::InvalidUrl => "{label} must be a valid URL",
                Message::InvalidDate => "{label} must be a valid date",
                Message::NotANumber => "{label} must be a number",
                Message::TooShort(_) => "{label} must be at least {bound} characters",
                Message::TooLong(_) => "{label} must be at most {bound} characters",
                Message::TooSmall(_) => "{label} must be at least {bound}",
                Message::TooLarge(_) => "{label} must be at most {bound}",
                Message::PatternMismatch => "{label} has an invalid format",
                Message::InvalidOption => "{label} has an invalid selection",
            },
        }
    }

    fn bound(&self) -> Option<f64> {
        match self {
            Message::TooShort(b) | Message::TooLong(b) | Message::TooSmall(b) | Message::TooLarge(b) => Some(*b),
            _ => None,
        }
    }

    /// Render the message for a field label
    pub fn render(&self, label: &str, locale: Locale) -> String {
        // bound first: labels are free text and may contain placeholders
        let template = self.template(locale);
        let text = match self.bound() {
            Some(bound) => template.replace("{bound}", &number_value(bound).to_string()),
            None => template.to_string(),
        };
        text.replace("{label}", label)
    }
}
