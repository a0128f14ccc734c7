use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A fixed, enumerable preference category (cuisine, price tier, ...)
pub trait Category: Copy + Ord + 'static {
    /// Every value a member can hold a choice for
    const ALL: &'static [Self];

    /// Display label, identical to the serialized form
    fn label(self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cuisine {
    Japanese,
    Korean,
    Chinese,
    Thai,
    Vietnamese,
    Indian,
    Italian,
    Mexican,
    Mediterranean,
    American,
    Cafe,
    Seafood,
    /// Anything the import could not recognise; never matches a member choice
    #[serde(other)]
    Other,
}

impl Category for Cuisine {
    const ALL: &'static [Self] = &[
        Cuisine::Japanese,
        Cuisine::Korean,
        Cuisine::Chinese,
        Cuisine::Thai,
        Cuisine::Vietnamese,
        Cuisine::Indian,
        Cuisine::Italian,
        Cuisine::Mexican,
        Cuisine::Mediterranean,
        Cuisine::American,
        Cuisine::Cafe,
        Cuisine::Seafood,
    ];

    fn label(self) -> &'static str {
        match self {
            Cuisine::Japanese => "Japanese",
            Cuisine::Korean => "Korean",
            Cuisine::Chinese => "Chinese",
            Cuisine::Thai => "Thai",
            Cuisine::Vietnamese => "Vietnamese",
            Cuisine::Indian => "Indian",
            Cuisine::Italian => "Italian",
            Cuisine::Mexican => "Mexican",
            Cuisine::Mediterranean => "Mediterranean",
            Cuisine::American => "American",
            Cuisine::Cafe => "Cafe",
            Cuisine::Seafood => "Seafood",
            Cuisine::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Premium,
}

impl Category for PriceRange {
    const ALL: &'static [Self] = &[PriceRange::Budget, PriceRange::Moderate, PriceRange::Premium];

    fn label(self) -> &'static str {
        match self {
            PriceRange::Budget => "$",
            PriceRange::Moderate => "$$",
            PriceRange::Premium => "$$$",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceLevel {
    Near,
    Medium,
    Far,
}

impl Category for DistanceLevel {
    const ALL: &'static [Self] = &[DistanceLevel::Near, DistanceLevel::Medium, DistanceLevel::Far];

    fn label(self) -> &'static str {
        match self {
            DistanceLevel::Near => "near",
            DistanceLevel::Medium => "medium",
            DistanceLevel::Far => "far",
        }
    }
}

/// Distance is not surveyed; cheaper places are assumed to be closer.
impl From<PriceRange> for DistanceLevel {
    fn from(price: PriceRange) -> Self {
        match price {
            PriceRange::Budget => DistanceLevel::Near,
            PriceRange::Moderate => DistanceLevel::Medium,
            PriceRange::Premium => DistanceLevel::Far,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiceLevel {
    Mild,
    Medium,
    Hot,
}

impl Category for SpiceLevel {
    const ALL: &'static [Self] = &[SpiceLevel::Mild, SpiceLevel::Medium, SpiceLevel::Hot];

    fn label(self) -> &'static str {
        match self {
            SpiceLevel::Mild => "mild",
            SpiceLevel::Medium => "medium",
            SpiceLevel::Hot => "hot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietTag {
    Vegetarian,
    Vegan,
    Halal,
    GlutenFree,
}

impl Category for DietTag {
    const ALL: &'static [Self] = &[
        DietTag::Vegetarian,
        DietTag::Vegan,
        DietTag::Halal,
        DietTag::GlutenFree,
    ];

    fn label(self) -> &'static str {
        match self {
            DietTag::Vegetarian => "vegetarian",
            DietTag::Vegan => "vegan",
            DietTag::Halal => "halal",
            DietTag::GlutenFree => "gluten-free",
        }
    }
}

/// Normalized restaurant record, immutable after load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rating: f64,
    pub price_range: PriceRange,
    pub cuisine: Cuisine,
    pub distance_level: DistanceLevel,
    pub spiciness_level: SpiceLevel,
    #[serde(default)]
    pub diet_tags: BTreeSet<DietTag>,
    #[serde(default)]
    pub hours: Vec<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub menu_sample: Vec<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_comment: Option<String>,
}

/// Tri-state preference for a single category value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceChoice {
    Yes,
    No,
    #[default]
    Neutral,
}

impl PreferenceChoice {
    /// Next value in the neutral -> yes -> no -> neutral tap order
    pub fn cycle(self) -> Self {
        match self {
            PreferenceChoice::Neutral => PreferenceChoice::Yes,
            PreferenceChoice::Yes => PreferenceChoice::No,
            PreferenceChoice::No => PreferenceChoice::Neutral,
        }
    }
}

/// A choice for every value of one category.
///
/// Values never go missing: construction starts from all-neutral, and
/// deserialization fills any absent value with `neutral` and drops values
/// outside the category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet<T: Category> {
    choices: BTreeMap<T, PreferenceChoice>,
}

impl<T: Category> ChoiceSet<T> {
    pub fn neutral() -> Self {
        Self {
            choices: T::ALL
                .iter()
                .map(|value| (*value, PreferenceChoice::Neutral))
                .collect(),
        }
    }

    /// Choice for a value; values outside the category read as neutral
    pub fn get(&self, value: T) -> PreferenceChoice {
        self.choices.get(&value).copied().unwrap_or_default()
    }

    pub fn set(&mut self, value: T, choice: PreferenceChoice) {
        if let Some(slot) = self.choices.get_mut(&value) {
            *slot = choice;
        }
    }

    /// Builder-style [`ChoiceSet::set`]
    pub fn with(mut self, value: T, choice: PreferenceChoice) -> Self {
        self.set(value, choice);
        self
    }

    pub fn has_yes(&self) -> bool {
        self.choices.values().any(|choice| *choice == PreferenceChoice::Yes)
    }

    /// Values marked with `choice`, in category order
    pub fn marked(&self, choice: PreferenceChoice) -> impl Iterator<Item = T> + '_ {
        self.choices
            .iter()
            .filter(move |(_, c)| **c == choice)
            .map(|(value, _)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (T, PreferenceChoice)> + '_ {
        self.choices.iter().map(|(value, choice)| (*value, *choice))
    }

    /// Whether a single-valued category rules out `value`.
    ///
    /// An explicit `no` always excludes. Once any value in the category is
    /// `yes`, the category acts as an allow-list and everything not marked
    /// `yes` is excluded too.
    pub fn excludes(&self, value: T) -> bool {
        match self.get(value) {
            PreferenceChoice::No => true,
            PreferenceChoice::Yes => false,
            PreferenceChoice::Neutral => self.has_yes(),
        }
    }
}

impl<T: Category> Default for ChoiceSet<T> {
    fn default() -> Self {
        Self::neutral()
    }
}

impl<T: Category + Serialize> Serialize for ChoiceSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.choices.serialize(serializer)
    }
}

impl<'de, T: Category> Deserialize<'de> for ChoiceSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, PreferenceChoice>::deserialize(deserializer)?;
        let mut set = Self::neutral();
        for (label, choice) in raw {
            if let Some(value) = T::from_label(&label) {
                set.set(value, choice);
            }
        }
        Ok(set)
    }
}

/// One member's preferences across all five categories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPreferences {
    #[serde(default)]
    pub cuisine: ChoiceSet<Cuisine>,
    #[serde(default)]
    pub price: ChoiceSet<PriceRange>,
    #[serde(default)]
    pub distance: ChoiceSet<DistanceLevel>,
    #[serde(default)]
    pub spice: ChoiceSet<SpiceLevel>,
    #[serde(default)]
    pub diet: ChoiceSet<DietTag>,
}

/// Session participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(rename = "joinedAt")]
    pub joined_at: DateTime<Utc>,
}

/// Placeholder names handed out in join order
const MEMBER_LABELS: [&str; 6] = ["User A", "User B", "User C", "User D", "User E", "User F"];

impl Member {
    /// Name for a member who did not give one, by join position (0-based)
    pub fn default_name(position: usize) -> String {
        MEMBER_LABELS
            .get(position)
            .map(|label| label.to_string())
            .unwrap_or_else(|| format!("User {}", position + 1))
    }
}

/// A member's vote on one restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeValue {
    Like,
    Dislike,
    Neutral,
}

/// Restaurant id -> vote, for one member
pub type SwipeMap = HashMap<String, SwipeValue>;

/// Member id -> that member's votes
pub type SwipeTable = HashMap<String, SwipeMap>;

/// Aggregated votes for one restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantScore {
    pub restaurant: Restaurant,
    #[serde(rename = "likeCount")]
    pub like_count: usize,
    #[serde(rename = "dislikeCount")]
    pub dislike_count: usize,
    pub score: f64,
    #[serde(rename = "likedBy")]
    pub liked_by: Vec<String>,
}

impl RestaurantScore {
    /// Whether anybody cast a like or dislike on this restaurant
    pub fn has_votes(&self) -> bool {
        self.like_count + self.dislike_count > 0
    }
}

/// Group-level readiness derived from the ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusStatus {
    #[serde(rename = "consensusScore")]
    pub consensus_score: u8,
    #[serde(rename = "decisionReady")]
    pub decision_ready: bool,
}

/// How far one member is through their deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProgress {
    pub id: String,
    pub name: String,
    pub total: usize,
    pub liked: usize,
    pub disliked: usize,
    pub neutral: usize,
    pub complete: bool,
    pub progress: u8,
}

/// Everything a group session owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub code: String,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub members: Vec<Member>,
    #[serde(default)]
    pub preferences: HashMap<String, MemberPreferences>,
    #[serde(default)]
    pub swipes: SwipeTable,
}

impl SessionState {
    /// Name given to sessions created without one
    pub const DEFAULT_NAME: &'static str = "Tonight's crew";

    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == member_id)
    }

    pub fn preferences_for(&self, member_id: &str) -> Option<&MemberPreferences> {
        self.preferences.get(member_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
