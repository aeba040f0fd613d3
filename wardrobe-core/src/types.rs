use std::collections::BTreeSet;
use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// One of the four canonical seasons, in calendar order.
///
/// Serializes as the lowercase name and deserializes through
/// [`Season::from_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    /// Parse a single season token. Accepts the canonical names, "fall" and
    /// the Chinese labels stored garment records use.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "spring" | "春" | "春季" | "春天" => Some(Season::Spring),
            "summer" | "夏" | "夏季" | "夏天" => Some(Season::Summer),
            "autumn" | "fall" | "秋" | "秋季" | "秋天" => Some(Season::Autumn),
            "winter" | "冬" | "冬季" | "冬天" => Some(Season::Winter),
            _ => None,
        }
    }

    /// Season of a calendar month (1-12), northern hemisphere.
    pub fn for_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn for_date(date: impl Datelike) -> Self {
        Self::for_month(date.month())
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Season {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Season::from_label(&label)
            .ok_or_else(|| format!("unknown season: {}", label))
    }
}

/// A set of seasons.
///
/// Membership is exact: "spring" never matches a longer token that merely
/// starts with it. Iteration and `Display` use calendar order.
///
/// Serializes as a list. Deserializes from a list or a comma-separated
/// string; unknown tokens are dropped either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Season>", from = "SeasonLabels")]
pub struct SeasonSet(u8);

#[derive(Deserialize)]
#[serde(untagged)]
enum SeasonLabels {
    Text(String),
    List(Vec<String>),
}

impl SeasonSet {
    pub fn new() -> Self {
        Self(0)
    }

    /// Parse a comma-separated list such as `"spring,summer"`. Unknown tokens
    /// are dropped. Both ASCII and full-width commas separate tokens.
    pub fn parse_list(text: &str) -> Self {
        text.split([',', '，'])
            .filter_map(Season::from_label)
            .collect()
    }

    pub fn insert(&mut self, season: Season) {
        self.0 |= season.bit();
    }

    pub fn contains(&self, season: Season) -> bool {
        self.0 & season.bit() != 0
    }

    pub fn union(&self, other: &SeasonSet) -> SeasonSet {
        SeasonSet(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Season> + '_ {
        Season::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

impl FromIterator<Season> for SeasonSet {
    fn from_iter<I: IntoIterator<Item = Season>>(iter: I) -> Self {
        let mut set = SeasonSet::new();
        for season in iter {
            set.insert(season);
        }
        set
    }
}

impl From<SeasonLabels> for SeasonSet {
    fn from(labels: SeasonLabels) -> Self {
        match labels {
            SeasonLabels::Text(text) => SeasonSet::parse_list(&text),
            SeasonLabels::List(items) => items
                .iter()
                .filter_map(|item| Season::from_label(item))
                .collect(),
        }
    }
}

impl From<SeasonSet> for Vec<Season> {
    fn from(set: SeasonSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for SeasonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|s| s.as_str()).collect();
        f.write_str(&names.join(","))
    }
}

/// Garment category.
///
/// Deserializes through [`GarmentCategory::from_label`], so any text is
/// accepted and unknown labels become `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum GarmentCategory {
    Top,
    Bottom,
    Dress,
    Outerwear,
    Shoes,
    Accessory,
    Jewelry,
    Other,
}

impl GarmentCategory {
    pub const ALL: [GarmentCategory; 8] = [
        GarmentCategory::Top,
        GarmentCategory::Bottom,
        GarmentCategory::Dress,
        GarmentCategory::Outerwear,
        GarmentCategory::Shoes,
        GarmentCategory::Accessory,
        GarmentCategory::Jewelry,
        GarmentCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GarmentCategory::Top => "top",
            GarmentCategory::Bottom => "bottom",
            GarmentCategory::Dress => "dress",
            GarmentCategory::Outerwear => "outerwear",
            GarmentCategory::Shoes => "shoes",
            GarmentCategory::Accessory => "accessory",
            GarmentCategory::Jewelry => "jewelry",
            GarmentCategory::Other => "other",
        }
    }

    /// Map model or user text to a category. Anything unrecognised is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "top" | "tops" | "shirt" | "t-shirt" | "blouse" | "sweater" | "上衣" => {
                GarmentCategory::Top
            }
            "bottom" | "pants" | "trousers" | "jeans" | "shorts" | "裤子" | "下装" => {
                GarmentCategory::Bottom
            }
            "dress" | "dresses" | "skirt" | "裙子" | "连衣裙" => GarmentCategory::Dress,
            "outerwear" | "coat" | "jacket" | "外套" => GarmentCategory::Outerwear,
            "shoes" | "shoe" | "footwear" | "鞋子" | "鞋" => GarmentCategory::Shoes,
            "accessory" | "accessories" | "配饰" => GarmentCategory::Accessory,
            "jewelry" | "jewellery" | "首饰" => GarmentCategory::Jewelry,
            _ => GarmentCategory::Other,
        }
    }
}

impl fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for GarmentCategory {
    fn from(label: String) -> Self {
        GarmentCategory::from_label(&label)
    }
}

/// Structured attributes of a single garment, either recognised by the model
/// or synthesised by the default generator.
///
/// `confidence` is present only for model-derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentAttributes {
    pub category: GarmentCategory,
    pub color: String,
    pub seasons: SeasonSet,
    pub style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl GarmentAttributes {
    pub fn is_ai_derived(&self) -> bool {
        self.confidence.is_some()
    }

    /// Name used when a garment is first stored, e.g. "red top".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.color, self.category)
    }
}

/// Read-only view of a stored garment offered to the recommendation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentCandidate {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub category: GarmentCategory,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub seasons: SeasonSet,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl GarmentCandidate {
    /// Stored name, or "{color} {category}" when the garment was never named.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let color = self.color.as_deref().unwrap_or("");
                format!("{} {}", color, self.category).trim().to_string()
            }
        }
    }
}

/// Caller-supplied context for a recommendation. Every field is optional and
/// an absent field leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationConstraints {
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub style_preference: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub excluded_ids: BTreeSet<i64>,
}

/// A validated outfit.
///
/// Every id in `clothes_ids` belongs to the candidate pool the outfit was
/// chosen from, and the list is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub name: String,
    pub clothes_ids: Vec<i64>,
    pub style: Option<String>,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub reasoning: String,
}

/// Result of a pipeline stage.
///
/// The raw model text is kept on both arms so failures can be diagnosed.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome<T> {
    Success {
        value: T,
        raw_response: String,
    },
    Failure {
        error: PipelineError,
        raw_response: Option<String>,
    },
}

impl<T> PipelineOutcome<T> {
    pub fn success(value: T, raw_response: impl Into<String>) -> Self {
        Self::Success {
            value,
            raw_response: raw_response.into(),
        }
    }

    pub fn failure(error: PipelineError, raw_response: Option<String>) -> Self {
        Self::Failure {
            error,
            raw_response,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Success { raw_response, .. } => Some(raw_response),
            Self::Failure { raw_response, .. } => raw_response.as_deref(),
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PipelineOutcome<U> {
        match self {
            Self::Success {
                value,
                raw_response,
            } => PipelineOutcome::Success {
                value: f(value),
                raw_response,
            },
            Self::Failure {
                error,
                raw_response,
            } => PipelineOutcome::Failure {
                error,
                raw_response,
            },
        }
    }

    /// Chain a stage that only runs on success. The follow-up receives the
    /// value and the raw text it came from.
    pub fn and_then<U>(
        self,
        f: impl FnOnce(T, String) -> PipelineOutcome<U>,
    ) -> PipelineOutcome<U> {
        match self {
            Self::Success {
                value,
                raw_response,
            } => f(value, raw_response),
            Self::Failure {
                error,
                raw_response,
            } => PipelineOutcome::Failure {
                error,
                raw_response,
            },
        }
    }

    pub fn into_result(self) -> Result<T, PipelineError> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failure { error, .. } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_set_exact_membership() {
        let set = SeasonSet::parse_list("springtime,summer");
        assert!(!set.contains(Season::Spring));
        assert!(set.contains(Season::Summer));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_season_set_parse_drops_unknown_and_accepts_aliases() {
        let set = SeasonSet::parse_list("spring, monsoon，秋季,fall");
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Season::Spring, Season::Autumn]
        );
        assert_eq!(set.to_string(), "spring,autumn");
    }

    #[test]
    fn test_season_set_union() {
        let a: SeasonSet = [Season::Winter].into_iter().collect();
        let b: SeasonSet = [Season::Spring].into_iter().collect();
        assert_eq!(a.union(&b).to_string(), "spring,winter");
        assert!(SeasonSet::new().is_empty());
    }

    #[test]
    fn test_season_set_serde_as_list() {
        let set = SeasonSet::parse_list("summer,spring");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["spring","summer"]"#);
        let back: SeasonSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_candidate_accepts_stored_labels() {
        let json = r#"{"id": 7, "category": "上衣", "seasons": "spring,summer"}"#;
        let candidate: GarmentCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.category, GarmentCategory::Top);
        assert_eq!(candidate.seasons.to_string(), "spring,summer");
        assert!(candidate.available);

        let json = r#"{"id": 8, "category": "cape", "seasons": ["fall", "冬季", "monsoon"]}"#;
        let candidate: GarmentCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.category, GarmentCategory::Other);
        assert_eq!(candidate.seasons.to_string(), "autumn,winter");
    }

    #[test]
    fn test_season_deserializes_labels() {
        let season: Season = serde_json::from_str(r#""fall""#).unwrap();
        assert_eq!(season, Season::Autumn);
        let season: Season = serde_json::from_str(r#""春季""#).unwrap();
        assert_eq!(season, Season::Spring);
        assert!(serde_json::from_str::<Season>(r#""monsoon""#).is_err());
        let json = serde_json::to_string(&Season::Autumn).unwrap();
        assert_eq!(json, r#""autumn""#);
    }

    #[test]
    fn test_season_for_month() {
        assert_eq!(Season::for_month(3), Season::Spring);
        assert_eq!(Season::for_month(8), Season::Summer);
        assert_eq!(Season::for_month(11), Season::Autumn);
        assert_eq!(Season::for_month(12), Season::Winter);
        assert_eq!(Season::for_month(2), Season::Winter);

        let date = chrono::NaiveDate::from_ymd_opt(2024, 7, 14).unwrap();
        assert_eq!(Season::for_date(date), Season::Summer);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(GarmentCategory::from_label("上衣"), GarmentCategory::Top);
        assert_eq!(
            GarmentCategory::from_label(" Pants "),
            GarmentCategory::Bottom
        );
        assert_eq!(
            GarmentCategory::from_label("首饰"),
            GarmentCategory::Jewelry
        );
        assert_eq!(GarmentCategory::from_label("cape"), GarmentCategory::Other);
    }

    #[test]
    fn test_candidate_display_name_fallback() {
        let mut candidate = GarmentCandidate {
            id: 1,
            name: None,
            category: GarmentCategory::Top,
            color: Some("red".to_string()),
            seasons: SeasonSet::new(),
            style: None,
            available: true,
        };
        assert_eq!(candidate.display_name(), "red top");

        candidate.color = None;
        assert_eq!(candidate.display_name(), "top");

        candidate.name = Some("Favourite tee".to_string());
        assert_eq!(candidate.display_name(), "Favourite tee");
    }

    #[test]
    fn test_outcome_and_then_keeps_raw_on_failure() {
        let outcome: PipelineOutcome<u32> =
            PipelineOutcome::failure(PipelineError::InvalidJson, Some("nope".to_string()));
        let chained = outcome.and_then(|v, raw| PipelineOutcome::success(v + 1, raw));
        assert_eq!(chained.raw_response(), Some("nope"));
        assert_eq!(chained.error(), Some(&PipelineError::InvalidJson));
    }
}
