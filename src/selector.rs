use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::config::ResolvedConfig;
use crate::domain::{ActionMode, OrganismCode, PathwayId};
use crate::error::KpwdError;
use crate::kegg::{KeggClient, parse_pathway_listing};

/// Where the pathway ids of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Search(String),
    List(Vec<String>),
    File(Utf8PathBuf),
    Commandline(Vec<String>),
}

impl Selection {
    /// Builds the selection for the configured action. Positional arguments
    /// are the search term, the input file or the ids, depending on the mode.
    pub fn from_config(config: &ResolvedConfig, args: &[String]) -> Result<Self, KpwdError> {
        match config.action {
            ActionMode::All => Ok(Selection::All),
            ActionMode::Search => args
                .first()
                .map(|term| term.trim().to_string())
                .filter(|term| !term.is_empty())
                .or_else(|| config.topic.clone())
                .map(Selection::Search)
                .ok_or(KpwdError::MissingSearchTerm),
            ActionMode::List => {
                if config.map_ids.is_empty() {
                    return Err(KpwdError::EmptyPathwayList);
                }
                Ok(Selection::List(config.map_ids.clone()))
            }
            ActionMode::File => {
                let filename = args
                    .first()
                    .cloned()
                    .or_else(|| config.input_file.clone())
                    .filter(|name| !name.trim().is_empty())
                    .ok_or(KpwdError::MissingInputFile)?;
                Ok(Selection::File(resolve_input_path(
                    &config.config_dir,
                    filename.trim(),
                )))
            }
            ActionMode::Commandline => Ok(Selection::Commandline(args.to_vec())),
        }
    }

    pub fn action(&self) -> ActionMode {
        match self {
            Selection::All => ActionMode::All,
            Selection::Search(_) => ActionMode::Search,
            Selection::List(_) => ActionMode::List,
            Selection::File(_) => ActionMode::File,
            Selection::Commandline(_) => ActionMode::Commandline,
        }
    }
}

/// Produces the raw, not yet normalized, ids for a selection.
pub fn select<K: KeggClient + ?Sized>(
    kegg: &K,
    selection: &Selection,
    org: &OrganismCode,
) -> Result<Vec<String>, KpwdError> {
    let ids = match selection {
        Selection::All => {
            info!(org = %org, "beginning download of all KEGG pathway maps");
            let body = kegg.list_pathways(org)?;
            into_strings(parse_pathway_listing(&body, org))
        }
        Selection::Search(term) => {
            info!(term, "beginning download of pathways matching search term");
            let body = kegg.find_pathways(term)?;
            into_strings(parse_pathway_listing(&body, org))
        }
        Selection::List(ids) => {
            if ids.is_empty() {
                return Err(KpwdError::EmptyPathwayList);
            }
            info!(count = ids.len(), "beginning download of configured map_ids");
            ids.clone()
        }
        Selection::File(path) => {
            info!(path = %path, "beginning download of pathways listed in input file");
            read_id_file(path)?
        }
        Selection::Commandline(args) => {
            info!(count = args.len(), "beginning download of pathways given on the command line");
            args.clone()
        }
    };
    debug!(?ids, "selected pathway ids");
    Ok(ids)
}

/// One id per line, trimmed; blank lines are skipped.
pub fn read_id_file(path: &Utf8Path) -> Result<Vec<String>, KpwdError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| KpwdError::Filesystem(format!("read {path}: {err}")))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn resolve_input_path(config_dir: &Utf8Path, filename: &str) -> Utf8PathBuf {
    let path = Utf8Path::new(filename);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    }
}

fn into_strings(ids: Vec<PathwayId>) -> Vec<String> {
    ids.into_iter().map(|id| id.as_str().to_string()).collect()
}
