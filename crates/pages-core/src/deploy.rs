//! Site deployment pipeline
//!
//! `deploy` runs nine guarded stages; a failure in stage *n* aborts
//! before stage *n+1* and names the stage in the surfaced error. Stage
//! nine (hosting activation) is the one exception: the content is
//! already published by then, so activation failures are logged and the
//! deploy still counts as successful.

use std::fmt;

use pages_fs::{NormalizedPath, io};
use pages_git::LocalRepo;
use pages_github::HostingProvider;

use crate::config::{
    DEFAULT_BRANCH, DEPLOY_COMMIT_MESSAGE, ORIGIN_REMOTE, RESERVED_TOP_LEVEL_FILES,
};
use crate::generator::GeneratorAdapter;
use crate::hosting::PagesConfigManager;
use crate::identity::Session;
use crate::rewrite;
use crate::state::RepositoryRef;
use crate::workspace::Site;
use crate::{Error, Result};

/// The guarded stages of a deploy, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    EnsureRemote,
    ResolveArtifact,
    BindArtifact,
    Generate,
    RewriteLinks,
    OverlayShared,
    Cname,
    Publish,
    ActivateHosting,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnsureRemote => "ensure-remote",
            Self::ResolveArtifact => "resolve-artifact",
            Self::BindArtifact => "bind-artifact",
            Self::Generate => "generate",
            Self::RewriteLinks => "rewrite-links",
            Self::OverlayShared => "overlay-shared",
            Self::Cname => "cname",
            Self::Publish => "publish",
            Self::ActivateHosting => "activate-hosting",
        };
        write!(f, "{name}")
    }
}

/// What a deploy did.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub site: String,
    /// Whether the publish repository was created on this run.
    pub created_remote: bool,
    pub artifact_dir: NormalizedPath,
    /// HTML files whose trailing attribution anchor was rewritten.
    pub rewritten_pages: usize,
    /// Whether first-time hosting activation ran.
    pub hosting_activated: bool,
}

/// Deploys one site: regenerate the artifact, bind it to its publish
/// repository, and force-publish the tip.
pub struct SiteDeploymentEngine<'a> {
    session: &'a Session,
    provider: &'a dyn HostingProvider,
    generator: GeneratorAdapter,
    hosting: PagesConfigManager,
}

impl<'a> SiteDeploymentEngine<'a> {
    pub fn new(session: &'a Session, provider: &'a dyn HostingProvider) -> Self {
        Self {
            session,
            provider,
            generator: GeneratorAdapter::new(),
            hosting: PagesConfigManager::new(session.layout().clone()),
        }
    }

    /// Run the full pipeline for one site.
    ///
    /// Concurrent deploys of the *same* site are the caller's problem to
    /// prevent; distinct sites never contend because every path touched
    /// is site-specific.
    pub fn deploy(&self, site: &Site) -> Result<DeployReport> {
        tracing::info!(site = %site.name, "Deploying site");

        // 1. The publish repository must exist remotely
        let created_remote = stage(DeployStage::EnsureRemote, || {
            if self.provider.repository_exists(&site.name)? {
                Ok(false)
            } else {
                self.provider.create_repository(&site.name, false)?;
                Ok(true)
            }
        })?;

        // 2. The artifact directory is named by site configuration,
        //    never assumed
        let artifact_dir = stage(DeployStage::ResolveArtifact, || {
            self.generator.artifact_dir(&site.dir)
        })?;
        let pages_ref = RepositoryRef::pages(self.session, &site.name, artifact_dir.clone());
        let creds = self.session.credentials();

        // 3. Bind the artifact directory to the publish repository and
        //    reset it to a clean slate
        let repo = stage(DeployStage::BindArtifact, || {
            let repo = if LocalRepo::is_repository(&pages_ref.local_path) {
                let repo = LocalRepo::open(&pages_ref.local_path, self.session.git_identity())?;
                repo.set_remote(ORIGIN_REMOTE, &pages_ref.remote_url(self.session))?;
                repo.ensure_local_branch(DEFAULT_BRANCH)?;
                repo
            } else {
                let repo = LocalRepo::init(&pages_ref.local_path, self.session.git_identity())?;
                repo.set_remote(ORIGIN_REMOTE, &pages_ref.remote_url(self.session))?;
                repo.ensure_local_branch(DEFAULT_BRANCH)?;
                if !created_remote {
                    // The remote predates this working copy: take its
                    // history in, with the build about to happen winning
                    // any divergence. A remote with no published branch
                    // yet has nothing to merge.
                    match repo.pull(
                        ORIGIN_REMOTE,
                        DEFAULT_BRANCH,
                        pages_ref.role.merge_favor(),
                        &creds,
                    ) {
                        Ok(_) => {}
                        Err(pages_git::Error::FetchFailed { message }) => {
                            tracing::debug!(site = %site.name, message = %message, "Remote has no history yet");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                repo
            };
            // Stale generated files must not leak into the new artifact
            io::clear_directory(&pages_ref.local_path, &[".git"])?;
            Ok(repo)
        })?;

        // 4. Regenerate from the site's source tree
        stage(DeployStage::Generate, || self.generator.generate(&site.dir))?;

        // 5. Rewrite the trailing attribution anchor of each page
        let rewritten_pages = stage(DeployStage::RewriteLinks, || {
            rewrite::rewrite_attribution_links(&artifact_dir)
        })?;

        // 6. Every site inherits the user's shared top-level files
        stage(DeployStage::OverlayShared, || {
            io::overlay_top_level_files(
                &self.session.user_dir(),
                &artifact_dir,
                RESERVED_TOP_LEVEL_FILES,
            )
            .map_err(Error::from)
        })?;

        // 7. CNAME: presence writes the file, absence removes it, on
        //    every deploy, not only when the mapping changed
        stage(DeployStage::Cname, || {
            let cname_path = artifact_dir.join("CNAME");
            match self.hosting.cname(self.session.login(), &site.name)? {
                Some(domain) => io::write_text(&cname_path, &domain)?,
                None => {
                    io::remove_file_if_exists(&cname_path)?;
                }
            }
            Ok(())
        })?;

        // 8. Publish. Only the tip state is meaningful to hosted
        //    consumers, so this is a force push by role policy.
        stage(DeployStage::Publish, || {
            repo.commit_all(DEPLOY_COMMIT_MESSAGE)?;
            repo.push(
                ORIGIN_REMOTE,
                DEFAULT_BRANCH,
                pages_ref.role.force_push(),
                &creds,
            )?;
            Ok(())
        })?;

        // 9. First-time hosting activation; failures never roll back
        //    the publish that already happened
        let hosting_activated = if created_remote {
            self.hosting.enable_hosting(
                self.provider,
                &pages_ref.owner,
                &site.name,
                DEFAULT_BRANCH,
                "/",
            );
            self.hosting
                .enforce_https(self.provider, &pages_ref.owner, &site.name);
            true
        } else {
            false
        };

        tracing::info!(site = %site.name, created_remote, "Deployed site");
        Ok(DeployReport {
            site: site.name.clone(),
            created_remote,
            artifact_dir,
            rewritten_pages,
            hosting_activated,
        })
    }
}

/// Tag errors from a stage with that stage, so every terminal failure
/// names where the pipeline stopped.
fn stage<T>(stage: DeployStage, f: impl FnOnce() -> Result<T>) -> Result<T> {
    f().map_err(|e| match e {
        tagged @ Error::Deploy { .. } => tagged,
        other => Error::Deploy {
            stage,
            source: Box::new(other),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tags_errors() {
        let result: Result<()> = stage(DeployStage::Generate, || {
            Err(Error::generation("boom"))
        });

        match result {
            Err(Error::Deploy { stage, source }) => {
                assert_eq!(stage, DeployStage::Generate);
                assert!(matches!(*source, Error::Generation { .. }));
            }
            other => panic!("expected tagged deploy error, got {other:?}"),
        }
    }

    #[test]
    fn test_stage_display_names() {
        assert_eq!(DeployStage::EnsureRemote.to_string(), "ensure-remote");
        assert_eq!(DeployStage::Publish.to_string(), "publish");
        assert_eq!(DeployStage::ActivateHosting.to_string(), "activate-hosting");
    }
}
