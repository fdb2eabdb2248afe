pub mod unlock;

use rust_embed::Embed;
use serde::Deserialize;
use thiserror::Error;

#[derive(Embed)]
#[folder = "assets/lessons/"]
struct LessonAssets;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    /// Introduces new keys, then drills them.
    Learn,
    /// Revisits previously introduced keys.
    Review,
    /// Longer mixed drill over everything introduced so far.
    Practice,
    /// Reading-only card; completes without typing and records no stats.
    Info,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    HomeRow,
    TopRow,
    BottomRow,
    Numbers,
}

/// Display and selection order for the lesson list.
pub const SECTION_ORDER: &[Section] = &[
    Section::HomeRow,
    Section::TopRow,
    Section::BottomRow,
    Section::Numbers,
];

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::HomeRow => "Home Row",
            Section::TopRow => "Top Row",
            Section::BottomRow => "Bottom Row",
            Section::Numbers => "Numbers",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    pub subtitle: String,
    pub kind: LessonKind,
    /// Keys available in this lesson; doubles as the normalizer allow-list.
    #[serde(default)]
    pub keys: Vec<char>,
    /// Keys introduced for the first time here.
    #[serde(default)]
    pub new_keys: Vec<char>,
    pub texts: Vec<String>,
    #[serde(default)]
    pub target_wpm: Option<u32>,
    #[serde(default)]
    pub min_accuracy: Option<u32>,
    /// Lesson id that must be completed with enough stars first.
    #[serde(default)]
    pub unlock_requirement: Option<u32>,
    pub section: Section,
}

impl Lesson {
    pub fn is_typed(&self) -> bool {
        self.kind != LessonKind::Info
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("lesson file {file} is not valid TOML: {source}")]
    Parse {
        file: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("lesson file {0} is not UTF-8")]
    Encoding(String),
    #[error("duplicate lesson id {0}")]
    DuplicateId(u32),
    #[error("lesson {lesson} requires unknown lesson {requires}")]
    MissingPrerequisite { lesson: u32, requires: u32 },
    #[error("lesson {lesson} requires info lesson {requires}, which never records stars")]
    InfoPrerequisite { lesson: u32, requires: u32 },
    #[error("typed lesson {0} has no practice texts")]
    NoTexts(u32),
}

#[derive(Deserialize)]
struct LessonFile {
    lessons: Vec<Lesson>,
}

/// The full ordered lesson catalog, parsed from the TOML files compiled
/// into the binary. Loading validates the data once at startup; the files
/// are under version control, so a validation failure is a build defect,
/// not a runtime condition.
pub struct Catalog {
    lessons: Vec<Lesson>,
}

impl Catalog {
    pub fn load() -> Result<Self, CatalogError> {
        let mut lessons = Vec::new();
        for name in LessonAssets::iter() {
            let file = LessonAssets::get(&name).expect("embedded asset listed but missing");
            let content = std::str::from_utf8(file.data.as_ref())
                .map_err(|_| CatalogError::Encoding(name.to_string()))?;
            let parsed: LessonFile =
                toml::from_str(content).map_err(|source| CatalogError::Parse {
                    file: name.to_string(),
                    source,
                })?;
            lessons.extend(parsed.lessons);
        }
        lessons.sort_by_key(|lesson| lesson.id);
        let catalog = Self { lessons };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for pair in self.lessons.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(CatalogError::DuplicateId(pair[0].id));
            }
        }
        for lesson in &self.lessons {
            if lesson.is_typed() && lesson.texts.is_empty() {
                return Err(CatalogError::NoTexts(lesson.id));
            }
            if let Some(required) = lesson.unlock_requirement {
                let Some(prerequisite) = self.get(required) else {
                    return Err(CatalogError::MissingPrerequisite {
                        lesson: lesson.id,
                        requires: required,
                    });
                };
                if !prerequisite.is_typed() {
                    return Err(CatalogError::InfoPrerequisite {
                        lesson: lesson.id,
                        requires: required,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id == id)
    }

    pub fn next_after(&self, id: u32) -> Option<&Lesson> {
        let idx = self.lessons.iter().position(|lesson| lesson.id == id)?;
        self.lessons.get(idx + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter()
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn by_section(&self, section: Section) -> impl Iterator<Item = &Lesson> {
        self.lessons
            .iter()
            .filter(move |lesson| lesson.section == section)
    }

    /// Lessons in the order the picker shows them: section by section.
    /// The selection index in the app counts rows in this order.
    pub fn rows(&self) -> Vec<&Lesson> {
        SECTION_ORDER
            .iter()
            .flat_map(|&section| self.by_section(section))
            .collect()
    }
}
