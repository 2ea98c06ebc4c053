use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::config::DEFAULT_EXTENSION;
use crate::domain::PathwayId;
use crate::error::KpwdError;

/// Flat output directory holding one `<id>.<ext>` file per pathway.
#[derive(Debug, Clone)]
pub struct PathwayStore {
    output_dir: Utf8PathBuf,
    extension: String,
}

impl PathwayStore {
    pub fn new(output_dir: Utf8PathBuf) -> Self {
        Self::with_extension(output_dir, DEFAULT_EXTENSION)
    }

    pub fn with_extension(output_dir: Utf8PathBuf, extension: &str) -> Self {
        Self {
            output_dir,
            extension: extension.to_string(),
        }
    }

    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    pub fn path_for(&self, id: &PathwayId) -> Utf8PathBuf {
        self.output_dir.join(format!("{id}.{}", self.extension))
    }

    pub fn ensure_output_dir(&self) -> Result<(), KpwdError> {
        fs::create_dir_all(self.output_dir.as_std_path()).map_err(|err| {
            KpwdError::Filesystem(format!("create {}: {err}", self.output_dir))
        })
    }

    /// Writes in place, replacing any previous file for the same id.
    pub fn save(&self, id: &PathwayId, content: &str) -> Result<Utf8PathBuf, KpwdError> {
        let path = self.path_for(id);
        fs::write(path.as_std_path(), content)
            .map_err(|err| KpwdError::Filesystem(format!("write {path}: {err}")))?;
        debug!(file = %path, "saved pathway");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let store = PathwayStore::new(Utf8PathBuf::from("/data/"));
        let id: PathwayId = "hsa00010".parse().unwrap();
        assert_eq!(store.path_for(&id).as_str(), "/data/hsa00010.xml");

        let store = PathwayStore::with_extension(Utf8PathBuf::from("./out/"), "kgml");
        assert_eq!(store.path_for(&id).as_str(), "./out/hsa00010.kgml");
    }

    #[test]
    fn save_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().join("nested")).unwrap();
        let store = PathwayStore::new(root);
        store.ensure_output_dir().unwrap();

        let id: PathwayId = "map00010".parse().unwrap();
        store.save(&id, "<pathway>first</pathway>").unwrap();
        let path = store.save(&id, "<pathway/>").unwrap();
        assert_eq!(std::fs::read_to_string(path.as_std_path()).unwrap(), "<pathway/>");
    }
}
