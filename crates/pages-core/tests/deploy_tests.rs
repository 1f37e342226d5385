//! Deployment pipeline tests with a stub generator and local remotes

use std::fs;

use pages_core::{
    DeployStage, Error, Identity, PagesConfigManager, Session, Site, SiteDeploymentEngine,
};
use pages_fs::{HomeLayout, NormalizedPath};
use pages_git::{GitIdentity, LocalRepo, MergeFavor, TokenCredentials};
use pages_test_utils::MockHostingProvider;
use pages_test_utils::generator::install_stub_generator;
use pages_test_utils::provider::remote_has_main;
use tempfile::TempDir;

fn setup(login: &str) -> (TempDir, Session, MockHostingProvider) {
    let temp = TempDir::new().unwrap();
    let provider = MockHostingProvider::new(login, temp.path().join("remotes"));
    let session = Session::new(
        Identity {
            login: login.into(),
            token: "test-token".into(),
        },
        HomeLayout::new(NormalizedPath::new(temp.path().join("home"))),
    )
    .with_remote_base(provider.remote_base());
    (temp, session, provider)
}

/// A session with a stub-generator site ready to deploy.
fn setup_with_site(login: &str, site_name: &str) -> (TempDir, Session, MockHostingProvider, Site) {
    let (temp, session, provider) = setup(login);
    let site_dir = session.site_dir(site_name);
    install_stub_generator(&site_dir.to_native());
    let site = Site {
        owner: login.to_string(),
        name: site_name.to_string(),
        dir: site_dir,
    };
    (temp, session, provider, site)
}

#[test]
fn test_first_deploy_creates_publishes_and_activates() {
    let (_temp, session, provider, site) = setup_with_site("octocat", "blog");
    let engine = SiteDeploymentEngine::new(&session, &provider);

    let report = engine.deploy(&site).unwrap();

    assert!(report.created_remote);
    assert!(report.hosting_activated);
    assert_eq!(report.rewritten_pages, 1);

    // The artifact is bound and published
    assert!(site.dir.join("public/.git").exists());
    assert!(remote_has_main(&provider.repo_path("octocat", "blog")));

    // Hosting was activated exactly once, HTTPS enforced
    assert_eq!(provider.pages_enable_count("blog"), 1);
    assert!(provider.https_enforced_for("blog"));

    // The trailing attribution anchor was rewritten, the leading one kept
    let index = fs::read_to_string(site.dir.join("public/index.html").to_native()).unwrap();
    assert_eq!(index.matches("hexo.io").count(), 1);
    assert!(index.contains("Pages Manager"));
}

#[test]
fn test_second_deploy_skips_activation() {
    let (_temp, session, provider, site) = setup_with_site("octocat", "blog");
    let engine = SiteDeploymentEngine::new(&session, &provider);

    engine.deploy(&site).unwrap();
    let report = engine.deploy(&site).unwrap();

    assert!(!report.created_remote);
    assert!(!report.hosting_activated);
    assert_eq!(provider.pages_enable_count("blog"), 1);
}

#[test]
fn test_shared_top_level_files_are_overlaid() {
    let (_temp, session, provider, site) = setup_with_site("octocat", "blog");

    // Shared assets and internal files at the user directory root
    let user_dir = session.user_dir().to_native();
    fs::create_dir_all(&user_dir).unwrap();
    fs::write(user_dir.join("favicon.ico"), "icon-bytes").unwrap();
    fs::write(user_dir.join("config.json"), "{\"sites\":{}}").unwrap();
    fs::write(user_dir.join(".gitignore"), "public/\n").unwrap();

    SiteDeploymentEngine::new(&session, &provider)
        .deploy(&site)
        .unwrap();

    let public = site.dir.join("public").to_native();
    assert!(public.join("favicon.ico").exists());
    assert!(!public.join("config.json").exists());
    assert!(!public.join(".gitignore").exists());
}

#[test]
fn test_cname_round_trip_across_deploys() {
    let (_temp, session, provider, site) = setup_with_site("octocat", "blog");
    let engine = SiteDeploymentEngine::new(&session, &provider);
    let manager = PagesConfigManager::new(session.layout().clone());

    manager
        .set_cname("octocat", "blog", Some("example.com"))
        .unwrap();
    engine.deploy(&site).unwrap();

    let cname_path = site.dir.join("public/CNAME").to_native();
    assert_eq!(fs::read_to_string(&cname_path).unwrap(), "example.com");

    // Clearing the mapping removes the file on the next deploy
    manager.set_cname("octocat", "blog", Some("")).unwrap();
    engine.deploy(&site).unwrap();
    assert!(!cname_path.exists());
}

#[test]
fn test_artifact_force_push_wins_over_divergent_remote() {
    let (temp, session, provider, site) = setup_with_site("octocat", "blog");
    let engine = SiteDeploymentEngine::new(&session, &provider);
    engine.deploy(&site).unwrap();

    // Someone pushed a divergent commit straight to the pages remote
    let intruder_path = NormalizedPath::new(temp.path().join("intruder"));
    let intruder = LocalRepo::init(
        &intruder_path,
        GitIdentity::new("intruder", "intruder@example.com"),
    )
    .unwrap();
    intruder
        .set_remote(
            "origin",
            &provider.repo_path("octocat", "blog").display().to_string(),
        )
        .unwrap();
    intruder.fetch("origin", "main", &TokenCredentials::anonymous()).unwrap();
    intruder.adopt_fetched_branch("main").unwrap();
    fs::write(intruder_path.to_native().join("index.html"), "hijacked").unwrap();
    intruder.commit_all("divergent").unwrap();
    intruder
        .push("origin", "main", true, &TokenCredentials::anonymous())
        .unwrap();

    // The next deploy must still succeed and its tip must win
    engine.deploy(&site).unwrap();

    let check_path = NormalizedPath::new(temp.path().join("check"));
    let check = LocalRepo::init(
        &check_path,
        GitIdentity::new("check", "check@example.com"),
    )
    .unwrap();
    check
        .set_remote(
            "origin",
            &provider.repo_path("octocat", "blog").display().to_string(),
        )
        .unwrap();
    check
        .pull("origin", "main", MergeFavor::Theirs, &TokenCredentials::anonymous())
        .unwrap();
    let index = fs::read_to_string(check_path.to_native().join("index.html")).unwrap();
    assert!(index.contains("Pages Manager"));
}

#[test]
fn test_binding_to_existing_remote_merges_then_rebuilds() {
    let (temp, session, provider, site) = setup_with_site("octocat", "blog");

    // The pages remote already has unrelated history
    provider.seed_repository("blog", false);
    let seeder_path = NormalizedPath::new(temp.path().join("seeder"));
    let seeder = LocalRepo::init(
        &seeder_path,
        GitIdentity::new("seeder", "seeder@example.com"),
    )
    .unwrap();
    seeder.ensure_local_branch("main").unwrap();
    fs::write(seeder_path.to_native().join("old.html"), "old artifact").unwrap();
    seeder.commit_all("previous deploy").unwrap();
    seeder
        .set_remote(
            "origin",
            &provider.repo_path("octocat", "blog").display().to_string(),
        )
        .unwrap();
    seeder
        .push("origin", "main", false, &TokenCredentials::anonymous())
        .unwrap();

    let report = SiteDeploymentEngine::new(&session, &provider)
        .deploy(&site)
        .unwrap();

    assert!(!report.created_remote);
    // The stale artifact file was cleared before regeneration
    assert!(!site.dir.join("public/old.html").exists());
    assert!(site.dir.join("public/index.html").exists());
}

#[test]
fn test_hosting_failure_does_not_fail_deploy() {
    let (_temp, session, provider, site) = setup_with_site("octocat", "blog");
    provider.fail_hosting_calls(true);

    let report = SiteDeploymentEngine::new(&session, &provider)
        .deploy(&site)
        .unwrap();

    // The deploy succeeded and published even though activation failed
    assert!(report.created_remote);
    assert!(report.hosting_activated);
    assert!(!provider.pages_enabled_for("blog"));
    assert!(remote_has_main(&provider.repo_path("octocat", "blog")));
}

#[test]
fn test_generation_failure_aborts_before_publish() {
    let (_temp, session, provider) = setup("octocat");
    let site_dir = session.site_dir("broken");
    fs::create_dir_all(site_dir.to_native()).unwrap();
    fs::write(
        site_dir.join("_config.yml").to_native(),
        "command: /nonexistent/generator\n",
    )
    .unwrap();
    let site = Site {
        owner: "octocat".into(),
        name: "broken".into(),
        dir: site_dir,
    };

    let result = SiteDeploymentEngine::new(&session, &provider).deploy(&site);

    match result {
        Err(Error::Deploy { stage, .. }) => assert_eq!(stage, DeployStage::Generate),
        other => panic!("expected generate-stage failure, got {other:?}"),
    }
    // Nothing was published
    assert!(!remote_has_main(&provider.repo_path("octocat", "broken")));
}
