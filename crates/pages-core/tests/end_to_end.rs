//! Fresh-identity scenario: first readiness pass provisions everything
//!
//! Starting from nothing (no home directory, no remotes), one
//! `ensure_ready` call must leave the identity with a database
//! repository and a published root `{login}.github.io` site, both
//! existing locally and remotely, with hosting activated.

use pages_core::config::{DATABASE_REPO_NAME, root_site_name};
use pages_core::{
    GeneratorAdapter, Identity, ReconciliationDirective, RepositoryRef, Session, Workspace,
    probe_state,
};
use pages_fs::{HomeLayout, NormalizedPath};
use pages_test_utils::MockHostingProvider;
use pages_test_utils::generator::install_stub_generator;
use pages_test_utils::provider::remote_has_main;
use tempfile::TempDir;

#[test]
fn test_fresh_identity_first_run_provisions_root_site() {
    let temp = TempDir::new().unwrap();
    let provider = MockHostingProvider::new("octocat", temp.path().join("remotes"));
    let session = Session::new(
        Identity {
            login: "octocat".into(),
            token: "test-token".into(),
        },
        HomeLayout::new(NormalizedPath::new(temp.path().join("home"))),
    )
    .with_remote_base(provider.remote_base());

    // The root site's source tree uses the stub generator so the deploy
    // step can actually build
    let root_name = root_site_name("octocat");
    install_stub_generator(&session.site_dir(&root_name).to_native());

    let workspace = Workspace::new(&session, &provider);
    let report = workspace.ensure_ready().unwrap();

    assert_eq!(report.directive, ReconciliationDirective::InitLocalAndPush);
    assert!(report.cold_start);

    // Database repository: local and remote both exist
    let db_state = probe_state(&provider, &RepositoryRef::database(&session)).unwrap();
    assert!(db_state.local_exists);
    assert!(db_state.remote_exists);
    assert!(remote_has_main(
        &provider.repo_path("octocat", DATABASE_REPO_NAME)
    ));

    // Root pages repository: artifact bound locally, published remotely
    let artifact_dir = GeneratorAdapter::new()
        .artifact_dir(&session.site_dir(&root_name))
        .unwrap();
    let pages_state = probe_state(
        &provider,
        &RepositoryRef::pages(&session, &root_name, artifact_dir),
    )
    .unwrap();
    assert!(pages_state.local_exists);
    assert!(pages_state.remote_exists);
    assert!(remote_has_main(&provider.repo_path("octocat", &root_name)));

    // Hosting is live for the root site
    assert!(provider.pages_enabled_for(&root_name));
    assert!(provider.https_enforced_for(&root_name));

    // A second readiness pass converges without re-provisioning
    let report = workspace.ensure_ready().unwrap();
    assert_eq!(report.directive, ReconciliationDirective::Pull);
    assert!(!report.cold_start);
    assert_eq!(provider.pages_enable_count(&root_name), 1);
}
