use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use kegg_pathway_downloader::config::{Config, ConfigLoader, Overrides, ResolvedConfig};
use kegg_pathway_downloader::domain::{OrganismCode, PathwayId};
use kegg_pathway_downloader::error::KpwdError;
use kegg_pathway_downloader::kegg::KeggClient;
use kegg_pathway_downloader::selector::{Selection, select};

struct CatalogKegg;

impl KeggClient for CatalogKegg {
    fn list_pathways(&self, org: &OrganismCode) -> Result<String, KpwdError> {
        Ok(format!(
            "path:{org}00010\tGlycolysis\npath:{org}00020\tTCA\npath:zzz00030\tOther\n"
        ))
    }

    fn find_pathways(&self, term: &str) -> Result<String, KpwdError> {
        if term == "missing" {
            return Err(KpwdError::KeggStatus {
                target: format!("search term {term}"),
                status: 400,
                message: "Bad Request".to_string(),
            });
        }
        Ok("path:map05200\tPathways in cancer\n".to_string())
    }

    fn get_kgml(&self, _id: &PathwayId) -> Result<String, KpwdError> {
        unreachable!("selection never downloads")
    }
}

fn resolved(config: Config, config_dir: &str) -> ResolvedConfig {
    ConfigLoader::resolve_config(config, Overrides::default(), Utf8PathBuf::from(config_dir))
        .unwrap()
}

fn config_for(action: &str) -> Config {
    Config {
        action: Some(action.to_string()),
        ..Config::default()
    }
}

#[test]
fn list_selection_preserves_order() {
    let config = resolved(
        Config {
            map_ids: Some(kegg_pathway_downloader::config::MapIds::Joined(
                "hsa00010,hsa00020".to_string(),
            )),
            ..config_for("list")
        },
        ".",
    );
    let selection = Selection::from_config(&config, &[]).unwrap();
    let ids = select(&CatalogKegg, &selection, &config.org).unwrap();
    assert_eq!(ids, vec!["hsa00010", "hsa00020"]);
}

#[test]
fn list_selection_requires_ids() {
    let config = resolved(config_for("list"), ".");
    let err = Selection::from_config(&config, &[]).unwrap_err();
    assert_matches!(err, KpwdError::EmptyPathwayList);
}

#[test]
fn search_term_from_args_then_topic() {
    let config = resolved(
        Config {
            topic: Some(" cancer ".to_string()),
            ..config_for("search")
        },
        ".",
    );
    let from_args = Selection::from_config(&config, &["apoptosis".to_string()]).unwrap();
    assert_eq!(from_args, Selection::Search("apoptosis".to_string()));
    let from_topic = Selection::from_config(&config, &[]).unwrap();
    assert_eq!(from_topic, Selection::Search("cancer".to_string()));

    let bare = resolved(config_for("search"), ".");
    let err = Selection::from_config(&bare, &[]).unwrap_err();
    assert_matches!(err, KpwdError::MissingSearchTerm);
}

#[test]
fn all_selection_filters_other_organisms() {
    let org: OrganismCode = "hsa".parse().unwrap();
    let ids = select(&CatalogKegg, &Selection::All, &org).unwrap();
    assert_eq!(ids, vec!["hsa00010", "hsa00020"]);
}

#[test]
fn search_failure_propagates() {
    let err = select(
        &CatalogKegg,
        &Selection::Search("missing".to_string()),
        &OrganismCode::reference(),
    )
    .unwrap_err();
    assert_matches!(err, KpwdError::KeggStatus { status: 400, .. });
}

#[test]
fn file_selection_reads_from_config_dir() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("pathways.txt"), "hsa00010\n00020\n\n").unwrap();
    let config = resolved(config_for("file"), temp.path().to_str().unwrap());

    let selection = Selection::from_config(&config, &["pathways.txt".to_string()]).unwrap();
    let ids = select(&CatalogKegg, &selection, &config.org).unwrap();
    assert_eq!(ids, vec!["hsa00010", "00020"]);
}

#[test]
fn file_selection_missing_file() {
    let temp = tempfile::tempdir().unwrap();
    let config = resolved(config_for("file"), temp.path().to_str().unwrap());

    let err = Selection::from_config(&config, &[]).unwrap_err();
    assert_matches!(err, KpwdError::MissingInputFile);

    let selection = Selection::from_config(&config, &["absent.txt".to_string()]).unwrap();
    let err = select(&CatalogKegg, &selection, &config.org).unwrap_err();
    assert_matches!(err, KpwdError::Filesystem(_));
}

#[test]
fn commandline_selection_is_literal() {
    let config = resolved(config_for("commandline"), ".");
    let args = vec!["00010".to_string(), "hsa00020".to_string()];
    let selection = Selection::from_config(&config, &args).unwrap();
    let ids = select(&CatalogKegg, &selection, &config.org).unwrap();
    assert_eq!(ids, args);
}
