use serde::{Deserialize, Serialize};

/// Capsule build categories, in declaration order (also the tie-break order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildCategory {
    Melee,
    Blast,
    KiBlast,
    Defense,
    Skill,
    KiEfficiency,
    Utility,
}

impl BuildCategory {
    pub const ALL: [BuildCategory; 7] = [
        BuildCategory::Melee,
        BuildCategory::Blast,
        BuildCategory::KiBlast,
        BuildCategory::Defense,
        BuildCategory::Skill,
        BuildCategory::KiEfficiency,
        BuildCategory::Utility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildCategory::Melee => "Melee",
            BuildCategory::Blast => "Blast",
            BuildCategory::KiBlast => "Ki Blast",
            BuildCategory::Defense => "Defense",
            BuildCategory::Skill => "Skill",
            BuildCategory::KiEfficiency => "Ki Efficiency",
            BuildCategory::Utility => "Utility",
        }
    }

    /// Classify a capsule `buildType`, case-insensitive, hyphens read as spaces.
    pub fn classify(build_type: &str) -> Option<Self> {
        let normalized = build_type.trim().to_lowercase().replace('-', " ");
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "melee" => Some(BuildCategory::Melee),
            "blast" => Some(BuildCategory::Blast),
            "ki blast" => Some(BuildCategory::KiBlast),
            "defense" | "defence" => Some(BuildCategory::Defense),
            "skill" => Some(BuildCategory::Skill),
            "ki efficiency" => Some(BuildCategory::KiEfficiency),
            "utility" => Some(BuildCategory::Utility),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for BuildCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One value per build category.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryBreakdown<T> {
    values: [T; 7],
}

impl<T: Copy + Default + std::ops::AddAssign> CategoryBreakdown<T> {
    pub fn get(&self, category: BuildCategory) -> T {
        self.values[category.index()]
    }

    pub fn add(&mut self, category: BuildCategory, amount: T) {
        self.values[category.index()] += amount;
    }

    pub fn iter(&self) -> impl Iterator<Item = (BuildCategory, T)> + '_ {
        BuildCategory::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

impl<T: Copy + Default + std::ops::AddAssign> FromIterator<(BuildCategory, T)> for CategoryBreakdown<T> {
    fn from_iter<I: IntoIterator<Item = (BuildCategory, T)>>(iter: I) -> Self {
        let mut breakdown = Self::default();
        for (category, amount) in iter {
            breakdown.add(category, amount);
        }
        breakdown
    }
}

// Serialized as a name -> value map so exports read naturally.
impl<T: Copy + Default + std::ops::AddAssign + Serialize> Serialize for CategoryBreakdown<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(BuildCategory::ALL.len()))?;
        for (category, value) in self.iter() {
            map.serialize_entry(category.as_str(), &value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    Pure,
    Focused,
    Dual,
    Balanced,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub cost: i64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildComposition {
    /// Category name, `Hybrid` or `No Build`.
    pub primary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: BuildKind,
    pub breakdown: Vec<CategoryShare>,
}

impl BuildComposition {
    pub fn no_build() -> Self {
        Self {
            primary: "No Build".to_string(),
            secondary: None,
            label: "No Build".to_string(),
            kind: BuildKind::None,
            breakdown: Vec::new(),
        }
    }
}

impl Default for BuildComposition {
    fn default() -> Self {
        Self::no_build()
    }
}
