use metrics_exporter_prometheus::PrometheusHandle;
use roster::courses::{
    CatalogEditor, CatalogSeed, CourseProgressService, InMemoryRoster, InstructorDesk,
};
use roster::error::AppError;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

const BUNDLED_SEED: &str = include_str!("../seed/catalog.json");

pub(crate) type RosterService = CourseProgressService<InMemoryRoster, InMemoryRoster>;
pub(crate) type RosterDesk = InstructorDesk<InMemoryRoster, InMemoryRoster>;
pub(crate) type RosterEditor = CatalogEditor<InMemoryRoster, InMemoryRoster>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Course services wired over one shared in-memory roster.
pub(crate) struct RosterServices {
    pub(crate) progress: Arc<RosterService>,
    pub(crate) desk: Arc<RosterDesk>,
    pub(crate) editor: Arc<RosterEditor>,
}

impl RosterServices {
    pub(crate) fn from_seed(seed: CatalogSeed) -> Self {
        let roster = Arc::new(InMemoryRoster::from_seed(seed));
        let progress = Arc::new(CourseProgressService::new(roster.clone(), roster.clone()));
        Self {
            desk: Arc::new(InstructorDesk::new(progress.clone())),
            editor: Arc::new(CatalogEditor::new(roster.clone(), roster)),
            progress,
        }
    }
}

/// Reads the catalog seed from `path`, falling back to the catalog bundled with the binary.
pub(crate) fn load_seed(path: Option<&Path>) -> Result<CatalogSeed, AppError> {
    let seed = match path {
        Some(path) => {
            info!(path = %path.display(), "loading roster seed");
            CatalogSeed::from_path(path)?
        }
        None => CatalogSeed::from_reader(Cursor::new(BUNDLED_SEED))?,
    };

    info!(
        ranks = seed.ranks.len(),
        courses = seed.courses.len(),
        members = seed.members.len(),
        approvals = seed.approvals.len(),
        "roster seed loaded"
    );
    Ok(seed)
}
