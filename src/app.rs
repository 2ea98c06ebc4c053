use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, warn};

use crate::config::ResolvedConfig;
use crate::domain::{ActionMode, DriverKind, OrganismCode, PathwayId, normalize_all};
use crate::error::KpwdError;
use crate::kegg::KeggClient;
use crate::selector::{Selection, select};
use crate::store::PathwayStore;

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub selection: Selection,
    pub org: OrganismCode,
    pub driver: DriverKind,
    pub max_in_flight: Option<usize>,
}

impl RunRequest {
    pub fn from_config(config: &ResolvedConfig, args: &[String]) -> Result<Self, KpwdError> {
        Ok(Self {
            selection: Selection::from_config(config, args)?,
            org: config.org.clone(),
            driver: config.driver,
            max_in_flight: config.max_in_flight,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedPathway {
    pub id: String,
    pub path: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    pub action: ActionMode,
    pub org: String,
    pub driver: DriverKind,
    pub output_dir: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pathways: Vec<SavedPathway>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink: Sync {
    fn event(&self, event: ProgressEvent);
}

pub struct Downloader<K: KeggClient> {
    kegg: K,
    store: PathwayStore,
}

impl<K: KeggClient> Downloader<K> {
    pub fn new(kegg: K, store: PathwayStore) -> Self {
        Self { kegg, store }
    }

    pub fn kegg(&self) -> &K {
        &self.kegg
    }

    /// Selects and normalizes every id before anything is downloaded, so a
    /// malformed entry fails the run up front.
    pub fn resolve_ids(
        &self,
        selection: &Selection,
        org: &OrganismCode,
    ) -> Result<Vec<PathwayId>, KpwdError> {
        let raw = select(&self.kegg, selection, org)?;
        normalize_all(&raw, org)
    }

    pub fn run(
        &self,
        request: &RunRequest,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadReport, KpwdError> {
        let started_at = Utc::now();
        let ids = self.resolve_ids(&request.selection, &request.org)?;
        sink.event(ProgressEvent {
            message: format!("selected {} pathway(s)", ids.len()),
            elapsed: None,
        });
        if ids.is_empty() {
            warn!("selection produced no pathway ids, nothing to download");
        }

        self.store.ensure_output_dir()?;
        let pathways = match request.driver {
            DriverKind::Sequential => self.fetch_sequential(&ids, sink)?,
            DriverKind::Concurrent => self.fetch_concurrent(&ids, request.max_in_flight, sink)?,
        };

        Ok(DownloadReport {
            action: request.selection.action(),
            org: request.org.to_string(),
            driver: request.driver,
            output_dir: self.store.output_dir().to_string(),
            started_at,
            finished_at: Utc::now(),
            pathways,
        })
    }

    /// One id at a time; the first failure ends the run.
    pub fn fetch_sequential(
        &self,
        ids: &[PathwayId],
        sink: &dyn ProgressSink,
    ) -> Result<Vec<SavedPathway>, KpwdError> {
        let mut saved = Vec::with_capacity(ids.len());
        for id in ids {
            saved.push(self.fetch_one(id, sink)?);
        }
        Ok(saved)
    }

    /// Runs fetch+save for up to `max_in_flight` ids at once, or for all of
    /// them when no limit is set. Files from successful operations are kept;
    /// if any operation failed, the first failure in id order is returned once
    /// its batch has settled and no further batch is started.
    pub fn fetch_concurrent(
        &self,
        ids: &[PathwayId],
        max_in_flight: Option<usize>,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<SavedPathway>, KpwdError> {
        let batch_size = max_in_flight.unwrap_or(ids.len()).max(1);
        let mut saved = Vec::with_capacity(ids.len());

        for batch in ids.chunks(batch_size) {
            let results = thread::scope(|scope| {
                let handles = batch
                    .iter()
                    .map(|id| scope.spawn(move || self.fetch_one(id, sink)))
                    .collect::<Vec<_>>();
                handles
                    .into_iter()
                    .zip(batch)
                    .map(|(handle, id)| {
                        handle.join().unwrap_or_else(|_| {
                            Err(KpwdError::Worker(format!("download worker for {id} panicked")))
                        })
                    })
                    .collect::<Vec<_>>()
            });

            let mut first_error = None;
            for (result, id) in results.into_iter().zip(batch) {
                match result {
                    Ok(item) => saved.push(item),
                    Err(err) => {
                        error!(pathway = %id, error = %err, "failed to download pathway");
                        first_error.get_or_insert(err);
                    }
                }
            }
            if let Some(err) = first_error {
                return Err(err);
            }
        }
        Ok(saved)
    }

    fn fetch_one(&self, id: &PathwayId, sink: &dyn ProgressSink) -> Result<SavedPathway, KpwdError> {
        let start = Instant::now();
        let content = self.kegg.get_kgml(id)?;
        let path = self.store.save(id, &content)?;
        sink.event(ProgressEvent {
            message: format!("saved {id}"),
            elapsed: Some(start.elapsed()),
        });
        Ok(SavedPathway {
            id: id.to_string(),
            path: path.to_string(),
            bytes: content.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::JsonOutput;
    use camino::Utf8PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockKegg {
        fetched: Mutex<Vec<String>>,
    }

    impl KeggClient for MockKegg {
        fn list_pathways(&self, _org: &OrganismCode) -> Result<String, KpwdError> {
            Ok("path:hsa00010\tGlycolysis\npath:hsa00020\tTCA cycle\n".to_string())
        }

        fn find_pathways(&self, _term: &str) -> Result<String, KpwdError> {
            Err(KpwdError::KeggHttp("not implemented".to_string()))
        }

        fn get_kgml(&self, id: &PathwayId) -> Result<String, KpwdError> {
            self.fetched.lock().unwrap().push(id.to_string());
            Ok(format!("<pathway name=\"path:{id}\"/>"))
        }
    }

    #[test]
    fn run_all_writes_catalog() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap();
        let downloader = Downloader::new(MockKegg::default(), PathwayStore::new(root.clone()));
        let request = RunRequest {
            selection: Selection::All,
            org: "hsa".parse().unwrap(),
            driver: DriverKind::Sequential,
            max_in_flight: None,
        };

        let report = downloader.run(&request, &JsonOutput).unwrap();

        assert_eq!(report.pathways.len(), 2);
        assert_eq!(report.action, ActionMode::All);
        assert!(root.join("hsa00010.xml").as_std_path().exists());
        assert!(root.join("hsa00020.xml").as_std_path().exists());
    }
}
