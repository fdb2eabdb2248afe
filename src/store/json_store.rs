use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::store::schema::ProgressData;

/// JSON-file persistence for lesson progress.
///
/// Reads are forgiving: a missing, corrupt, or stale-schema file resets to
/// defaults rather than surfacing an error to the child. Writes go through
/// a temp file and rename so a crash mid-save never leaves a torn file.
pub struct ProgressStore {
    base_dir: PathBuf,
}

const PROGRESS_FILE: &str = "progress.json";

impl ProgressStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typekid");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(PROGRESS_FILE)
    }

    pub fn load(&self) -> ProgressData {
        let path = self.file_path();
        if !path.exists() {
            return ProgressData::default();
        }
        let data: ProgressData = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => ProgressData::default(),
        };
        if data.needs_reset() {
            return ProgressData::default();
        }
        data
    }

    pub fn save(&self, data: &ProgressData) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
