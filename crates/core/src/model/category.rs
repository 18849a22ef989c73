use std::fmt;

use super::ids::CategoryKey;

/// The content categories shipped with the game.
///
/// Catalogs are not limited to these; any valid `CategoryKey` can be
/// registered. These are the ones a "new game" reset clears by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    GeneralQuestions,
    Confessions,
    Challenges,
    MostLikely,
    Penalties,
    ChallengeMaster,
    CharadesWords,
}

impl Category {
    const ALL: [Category; 7] = [
        Category::GeneralQuestions,
        Category::Confessions,
        Category::Challenges,
        Category::MostLikely,
        Category::Penalties,
        Category::ChallengeMaster,
        Category::CharadesWords,
    ];

    /// Every built-in category, in menu order.
    #[must_use]
    pub fn all() -> &'static [Category] {
        &Self::ALL
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::GeneralQuestions => "general_questions",
            Category::Confessions => "confessions",
            Category::Challenges => "challenges",
            Category::MostLikely => "most_likely",
            Category::Penalties => "penalties",
            Category::ChallengeMaster => "challenge_master",
            Category::CharadesWords => "charades_words",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == key)
    }

    #[must_use]
    pub fn key(self) -> CategoryKey {
        self.into()
    }
}

impl From<Category> for CategoryKey {
    fn from(category: Category) -> Self {
        CategoryKey::builtin(category.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
