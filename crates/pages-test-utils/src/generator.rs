//! Stub static-site generator for deployment tests.
//!
//! Installs a shell script into a site directory that mimics the
//! generator contract: `generate` produces a `public/` tree, `server`
//! blocks until killed. The emitted HTML carries two generator
//! attribution anchors so rewrite tests can assert last-occurrence-only
//! behavior.

use std::fs;
use std::path::Path;

const STUB_SCRIPT: &str = r#"#!/bin/sh
set -e
case "$1" in
  generate)
    mkdir -p public
    cat > public/index.html <<'EOF'
<html><body>
<p>Powered by <a href="https://hexo.io/">Hexo</a></p>
<footer><a href="https://hexo.io/">Hexo</a></footer>
</body></html>
EOF
    cat > public/about.html <<'EOF'
<html><body><p>About page, no attribution.</p></body></html>
EOF
    ;;
  server)
    while true; do sleep 1; done
    ;;
  *)
    echo "unknown command: $1" >&2
    exit 1
    ;;
esac
"#;

/// Write the stub generator script and a `_config.yml` pointing the
/// generation adapter at it.
///
/// # Panics
/// Panics if the site directory cannot be written.
pub fn install_stub_generator(site_dir: &Path) {
    fs::create_dir_all(site_dir)
        .unwrap_or_else(|e| panic!("install_stub_generator: create site dir: {e}"));

    let script_path = site_dir.join("stub-generator.sh");
    fs::write(&script_path, STUB_SCRIPT)
        .unwrap_or_else(|e| panic!("install_stub_generator: write script: {e}"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script_path, perms).unwrap();
    }

    fs::write(
        site_dir.join("_config.yml"),
        "command: ./stub-generator.sh\nsource_dir: source\npublic_dir: public\nport: 4000\n",
    )
    .unwrap_or_else(|e| panic!("install_stub_generator: write _config.yml: {e}"));

    fs::create_dir_all(site_dir.join("source/_posts"))
        .unwrap_or_else(|e| panic!("install_stub_generator: create source tree: {e}"));
    fs::write(
        site_dir.join("source/_posts/hello-world.md"),
        "---\ntitle: Hello World\n---\n\nFirst post.\n",
    )
    .unwrap_or_else(|e| panic!("install_stub_generator: write post: {e}"));
}
