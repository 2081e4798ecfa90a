//! Record shapes for every editable section, unified behind `ListRecord`.
//!
//! A record knows its id prefix, how to build itself from seed data, which
//! fields can be edited in place, and how to validate itself before persist.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::content::validation::{validate_bounded_number, validate_short_text, ValidationError};

pub const PERCENT_MIN: i64 = 0;
pub const PERCENT_MAX: i64 = 100;

/// Rejection of an in-place edit before it reaches the collection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("'{field}' is not an editable field of {record}")]
    UnknownField { record: &'static str, field: String },
}

/// Accepts `field` only if it is one of `editable`.
fn ensure_editable(
    record: &'static str,
    editable: &[&str],
    field: &str,
) -> Result<(), FieldError> {
    if editable.contains(&field) {
        Ok(())
    } else {
        Err(FieldError::UnknownField {
            record,
            field: field.to_string(),
        })
    }
}

/// A raw value submitted for a single field.
///
/// Text inputs and number inputs arrive through the same endpoint, so either
/// shape is accepted and coerced by the record that owns the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Text(s) => s,
        }
    }

    /// Integer reading of the value. Text is read up to its first non-digit
    /// (`"45%"` is 45); anything unreadable is 0.
    pub fn to_int_lossy(&self) -> i64 {
        match self {
            FieldValue::Integer(n) => *n,
            FieldValue::Float(f) if f.is_finite() => f.trunc() as i64,
            FieldValue::Float(_) => 0,
            FieldValue::Text(s) => leading_integer(s.trim()).unwrap_or(0),
        }
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let digits = &s[..end];
    match digits.parse() {
        Ok(n) => Some(n),
        // Too many digits for i64: saturate toward the sign.
        Err(_) if digits.bytes().any(|b| b.is_ascii_digit()) => {
            Some(if digits.starts_with('-') { i64::MIN } else { i64::MAX })
        }
        Err(_) => None,
    }
}

/// Clamps a percentage input to `[0, 100]`.
pub fn clamp_percent(value: i64) -> i64 {
    value.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// One item of an editable, persisted list.
pub trait ListRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Field values without an id: seed defaults and caller-supplied new records.
    type Seed: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Prefix of generated ids, e.g. `cert` for `cert_0`.
    const ID_PREFIX: &'static str;

    /// Name used in field errors.
    const KIND: &'static str;

    /// Field names `set_field` accepts.
    const EDITABLE_FIELDS: &'static [&'static str];

    /// Rejects a field name `set_field` would not accept, without needing a record.
    fn check_field(field: &str) -> Result<(), FieldError> {
        ensure_editable(Self::KIND, Self::EDITABLE_FIELDS, field)
    }

    fn from_seed(id: String, seed: Self::Seed) -> Self;

    /// Field values of a freshly added record when the caller supplies none.
    fn default_seed() -> Self::Seed;

    fn id(&self) -> &str;

    /// Replaces one field in place. Numeric fields are clamped here, at input
    /// time; text length is only checked by `validate`.
    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError>;

    /// Checks every field, stopping at the first violation.
    fn validate(&self) -> Result<(), ValidationError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Certifications
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationSeed {
    pub name: String,
    pub issuer: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub year: String,
}

impl ListRecord for Certification {
    type Seed = CertificationSeed;
    const ID_PREFIX: &'static str = "cert";
    const KIND: &'static str = "certification";
    const EDITABLE_FIELDS: &'static [&'static str] = &["name", "issuer", "year"];

    fn from_seed(id: String, seed: CertificationSeed) -> Self {
        Self {
            id,
            name: seed.name,
            issuer: seed.issuer,
            year: seed.year,
        }
    }

    fn default_seed() -> CertificationSeed {
        CertificationSeed {
            name: "New Certification".to_string(),
            issuer: "Issuer".to_string(),
            year: "2024".to_string(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        match field {
            "name" => self.name = value.into_text(),
            "issuer" => self.issuer = value.into_text(),
            "year" => self.year = value.into_text(),
            _ => {
                return Err(FieldError::UnknownField {
                    record: Self::KIND,
                    field: field.to_string(),
                })
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_short_text("name", &self.name)?;
        validate_short_text("issuer", &self.issuer)?;
        validate_short_text("year", &self.year)?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tech stack
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechSeed {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechItem {
    pub id: String,
    pub name: String,
}

impl ListRecord for TechItem {
    type Seed = TechSeed;
    const ID_PREFIX: &'static str = "tech";
    const KIND: &'static str = "tech item";
    const EDITABLE_FIELDS: &'static [&'static str] = &["name"];

    fn from_seed(id: String, seed: TechSeed) -> Self {
        Self { id, name: seed.name }
    }

    fn default_seed() -> TechSeed {
        TechSeed {
            name: "New Tech".to_string(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        match field {
            "name" => {
                self.name = value.into_text();
                Ok(())
            }
            _ => Err(FieldError::UnknownField {
                record: Self::KIND,
                field: field.to_string(),
            }),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_short_text("name", &self.name)?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Training progress
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSeed {
    pub course: String,
    pub progress: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingItem {
    pub id: String,
    pub course: String,
    pub progress: i64, // 0 – 100
}

impl ListRecord for TrainingItem {
    type Seed = TrainingSeed;
    const ID_PREFIX: &'static str = "training";
    const KIND: &'static str = "training item";
    const EDITABLE_FIELDS: &'static [&'static str] = &["course", "progress"];

    fn from_seed(id: String, seed: TrainingSeed) -> Self {
        Self {
            id,
            course: seed.course,
            progress: clamp_percent(seed.progress),
        }
    }

    fn default_seed() -> TrainingSeed {
        TrainingSeed {
            course: "New Course".to_string(),
            progress: 0,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        match field {
            "course" => self.course = value.into_text(),
            "progress" => self.progress = clamp_percent(value.to_int_lossy()),
            _ => {
                return Err(FieldError::UnknownField {
                    record: Self::KIND,
                    field: field.to_string(),
                })
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_short_text("course", &self.course)?;
        validate_bounded_number("progress", self.progress, PERCENT_MIN, PERCENT_MAX)?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skill categories (each with a nested list of rated skills)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSeed {
    pub name: String,
    pub level: i64,
}

impl SkillSeed {
    pub fn new_skill() -> Self {
        Self {
            name: "New Skill".to_string(),
            level: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: i64, // 0 – 100
}

impl Skill {
    pub const ID_PREFIX: &'static str = "skill";
    pub const KIND: &'static str = "skill";
    pub const EDITABLE_FIELDS: &'static [&'static str] = &["name", "level"];

    pub fn check_field(field: &str) -> Result<(), FieldError> {
        ensure_editable(Self::KIND, Self::EDITABLE_FIELDS, field)
    }

    pub fn from_seed(id: String, seed: SkillSeed) -> Self {
        Self {
            id,
            name: seed.name,
            level: clamp_percent(seed.level),
        }
    }

    pub fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        match field {
            "name" => self.name = value.into_text(),
            "level" => self.level = clamp_percent(value.to_int_lossy()),
            _ => {
                return Err(FieldError::UnknownField {
                    record: Self::KIND,
                    field: field.to_string(),
                })
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_short_text("skill name", &self.name)?;
        validate_bounded_number("skill level", self.level, PERCENT_MIN, PERCENT_MAX)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategorySeed {
    pub title: String,
    pub icon: String,
    #[serde(default)]
    pub skills: Vec<SkillSeed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub skills: Vec<Skill>,
}

impl SkillCategory {
    pub fn skill_mut(&mut self, skill_id: &str) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|s| s.id == skill_id)
    }
}

impl ListRecord for SkillCategory {
    type Seed = SkillCategorySeed;
    const ID_PREFIX: &'static str = "cat";
    const KIND: &'static str = "skill category";
    const EDITABLE_FIELDS: &'static [&'static str] = &["title", "icon"];

    /// Nested skills are numbered under the category id (`cat_0_skill_2`).
    fn from_seed(id: String, seed: SkillCategorySeed) -> Self {
        let skills = seed
            .skills
            .into_iter()
            .enumerate()
            .map(|(idx, skill)| Skill::from_seed(format!("{id}_{}_{idx}", Skill::ID_PREFIX), skill))
            .collect();
        Self {
            id,
            title: seed.title,
            icon: seed.icon,
            skills,
        }
    }

    fn default_seed() -> SkillCategorySeed {
        SkillCategorySeed {
            title: "New Category".to_string(),
            icon: "Code".to_string(),
            skills: vec![],
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        match field {
            "title" => self.title = value.into_text(),
            "icon" => self.icon = value.into_text(),
            _ => {
                return Err(FieldError::UnknownField {
                    record: Self::KIND,
                    field: field.to_string(),
                })
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_short_text("title", &self.title)?;
        validate_short_text("icon", &self.icon)?;
        for skill in &self.skills {
            skill.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training(progress: i64) -> TrainingItem {
        TrainingItem::from_seed(
            "training_0".to_string(),
            TrainingSeed {
                course: "Advanced System Design".to_string(),
                progress,
            },
        )
    }

    #[test]
    fn test_field_value_accepts_numbers_and_text() {
        let n: FieldValue = serde_json::from_str("150").unwrap();
        let f: FieldValue = serde_json::from_str("45.9").unwrap();
        let s: FieldValue = serde_json::from_str("\"Rust\"").unwrap();
        assert_eq!(n, FieldValue::Integer(150));
        assert_eq!(f.to_int_lossy(), 45);
        assert_eq!(s, FieldValue::Text("Rust".to_string()));
    }

    #[test]
    fn test_text_reads_leading_integer_or_zero() {
        assert_eq!(FieldValue::Text("72".into()).to_int_lossy(), 72);
        assert_eq!(FieldValue::Text(" 45% ".into()).to_int_lossy(), 45);
        assert_eq!(FieldValue::Text("-5".into()).to_int_lossy(), -5);
        assert_eq!(FieldValue::Text("abc".into()).to_int_lossy(), 0);
        assert_eq!(FieldValue::Text("".into()).to_int_lossy(), 0);
    }

    #[test]
    fn test_overflowing_text_saturates_then_clamps() {
        let mut item = training(45);
        item.set_field("progress", FieldValue::Text("99999999999999999999".into()))
            .unwrap();
        assert_eq!(item.progress, 100);
        item.set_field("progress", FieldValue::Text("-99999999999999999999".into()))
            .unwrap();
        assert_eq!(item.progress, 0);
        assert_eq!(FieldValue::Text("-".into()).to_int_lossy(), 0);
    }

    #[test]
    fn test_progress_clamped_on_input() {
        let mut item = training(45);
        item.set_field("progress", FieldValue::Integer(200)).unwrap();
        assert_eq!(item.progress, 100);
        item.set_field("progress", FieldValue::Integer(-5)).unwrap();
        assert_eq!(item.progress, 0);
        item.set_field("progress", FieldValue::Text("x".into())).unwrap();
        assert_eq!(item.progress, 0);
    }

    #[test]
    fn test_text_length_not_checked_on_input() {
        let mut item = training(10);
        item.set_field("course", FieldValue::Text("a".repeat(500))).unwrap();
        assert_eq!(item.course.len(), 500);
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_numeric_text_field_stored_as_text() {
        let mut cert = Certification::from_seed("cert_0".into(), Certification::default_seed());
        cert.set_field("year", FieldValue::Integer(2025)).unwrap();
        assert_eq!(cert.year, "2025");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut tech = TechItem::from_seed("tech_0".into(), TechItem::default_seed());
        let err = tech.set_field("level", FieldValue::Integer(3)).unwrap_err();
        assert!(err.to_string().contains("level"));
    }

    #[test]
    fn test_check_field_matches_set_field() {
        assert!(Certification::check_field("issuer").is_ok());
        assert!(TrainingItem::check_field("progress").is_ok());
        assert!(SkillCategory::check_field("icon").is_ok());
        assert!(Skill::check_field("level").is_ok());
        let err = TechItem::check_field("colour").unwrap_err();
        assert_eq!(
            err,
            FieldError::UnknownField {
                record: "tech item",
                field: "colour".to_string(),
            }
        );
        assert!(Skill::check_field("icon").is_err());
    }

    #[test]
    fn test_certification_validation_stops_at_first_field() {
        let cert = Certification {
            id: "cert_0".into(),
            name: "n".repeat(101),
            issuer: "".into(),
            year: "2023".into(),
        };
        assert_eq!(cert.validate().unwrap_err().field, "name");
    }

    #[test]
    fn test_category_seed_numbers_nested_skills() {
        let cat = SkillCategory::from_seed(
            "cat_1".into(),
            SkillCategorySeed {
                title: "Backend".into(),
                icon: "Database".into(),
                skills: vec![
                    SkillSeed { name: "Rust".into(), level: 90 },
                    SkillSeed { name: "SQL".into(), level: 140 },
                ],
            },
        );
        assert_eq!(cat.skills[0].id, "cat_1_skill_0");
        assert_eq!(cat.skills[1].id, "cat_1_skill_1");
        assert_eq!(cat.skills[1].level, 100);
    }

    #[test]
    fn test_category_validates_nested_skills() {
        let mut cat = SkillCategory::from_seed("cat_0".into(), SkillCategory::default_seed());
        cat.skills.push(Skill {
            id: "skill_1".into(),
            name: "".into(),
            level: 10,
        });
        assert_eq!(cat.validate().unwrap_err().field, "skill name");
    }
}
