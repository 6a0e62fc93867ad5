use std::cell::RefCell;

use tiny_cdn::{
  CdnSettings, ConfigError, HostContext, SiteOrigins, TinyCdn, UploadDir, UrlHook,
};

#[derive(Default)]
struct FakeHost {
  admin: bool,
  script_debug: bool,
  capabilities: Vec<&'static str>,
  checked: RefCell<Vec<String>>,
}

impl HostContext for FakeHost {
  fn is_admin(&self) -> bool {
    self.admin
  }

  fn script_debug(&self) -> bool {
    self.script_debug
  }

  fn has_capability(&self, capability: &str) -> bool {
    self.checked.borrow_mut().push(capability.to_string());
    self.capabilities.iter().any(|held| *held == capability)
  }
}

fn cdn(settings: CdnSettings) -> TinyCdn {
  TinyCdn::new(settings, SiteOrigins::from_site_url("https://example.com"))
}

fn configured() -> CdnSettings {
  CdnSettings {
    includes_url: Some("https://cdn.example/wp-includes".into()),
    content_url: Some("https://cdn.example/wp-content".into()),
    ..CdnSettings::default()
  }
}

const IMAGE: &str =
  r#"<p><img class="x" src="https://example.com/wp-content/uploads/a.png" alt="cat"/></p>"#;

#[test]
fn visitor_pass_rewrites_every_hook() {
  let host = FakeHost::default();
  let pass = cdn(configured()).begin_pass(&host).unwrap();

  assert_eq!(
    pass.filter_url(
      UrlHook::ScriptLoaderSrc,
      "https://example.com/wp-includes/js/jquery.js"
    ),
    "https://cdn.example/wp-includes/js/jquery.js"
  );
  assert_eq!(
    pass.filter_url(
      UrlHook::StyleLoaderSrc,
      "https://example.com/wp-content/themes/t/style.css"
    ),
    "https://cdn.example/wp-content/themes/t/style.css"
  );
  assert_eq!(
    pass.filter_url(UrlHook::PluginsUrl, "https://example.com/wp-content/plugins"),
    "https://cdn.example/wp-content/plugins"
  );
  assert_eq!(
    pass.filter_url(UrlHook::ThemeRootUri, "https://example.com/wp-includes/x"),
    "https://example.com/wp-includes/x"
  );
  assert_eq!(
    pass.filter_content(IMAGE),
    r#"<p><img class="x" src="https://cdn.example/wp-content/uploads/a.png" alt="cat"/></p>"#
  );

  let upload = pass.filter_upload_dir(UploadDir::new(
    "https://example.com/wp-content/uploads/2024/05",
    "https://example.com/wp-content/uploads",
  ));
  assert_eq!(upload.url, "https://cdn.example/wp-content/uploads/2024/05");
  assert_eq!(upload.base_url, "https://cdn.example/wp-content/uploads");

  assert_eq!(*host.checked.borrow(), vec!["edit_pages".to_string()]);
}

#[test]
fn dynamic_endpoints_are_never_rewritten() {
  let pass = cdn(configured()).begin_pass(&FakeHost::default()).unwrap();
  let url = "https://example.com/admin-ajax.php?action=x";
  for hook in UrlHook::ALL {
    assert_eq!(pass.filter_url(hook, url), url);
  }
}

#[test]
fn editors_get_origin_urls() {
  let host = FakeHost {
    capabilities: vec!["edit_pages"],
    ..FakeHost::default()
  };
  let pass = cdn(configured()).begin_pass(&host).unwrap();

  assert!(pass.config().is_bypassed());
  let url = "https://example.com/wp-includes/js/jquery.js";
  assert_eq!(pass.filter_url(UrlHook::ScriptLoaderSrc, url), url);
  assert_eq!(pass.filter_content(IMAGE), IMAGE);
}

#[test]
fn custom_capability_controls_bypass() {
  let settings = CdnSettings {
    capability: "manage_options".into(),
    ..configured()
  };
  let editor = FakeHost {
    capabilities: vec!["edit_pages"],
    ..FakeHost::default()
  };
  let pass = cdn(settings).begin_pass(&editor).unwrap();
  assert!(!pass.config().is_bypassed());
  assert_eq!(*editor.checked.borrow(), vec!["manage_options".to_string()]);
}

#[test]
fn disable_setting_bypasses_without_capability_check() {
  let settings = CdnSettings {
    disable: true,
    ..configured()
  };
  let host = FakeHost::default();
  let pass = cdn(settings).begin_pass(&host).unwrap();

  assert!(pass.config().is_bypassed());
  assert!(host.checked.borrow().is_empty());
  assert_eq!(pass.filter_content(IMAGE), IMAGE);
}

#[test]
fn admin_and_script_debug_requests_are_not_engaged() {
  let admin = FakeHost {
    admin: true,
    ..FakeHost::default()
  };
  let debug = FakeHost {
    script_debug: true,
    ..FakeHost::default()
  };
  let cdn = cdn(configured());
  assert!(cdn.begin_pass(&admin).is_none());
  assert!(cdn.begin_pass(&debug).is_none());
}

#[test]
fn unconfigured_origins_pass_through() {
  let pass = cdn(CdnSettings::default())
    .begin_pass(&FakeHost::default())
    .unwrap();
  let url = "https://example.com/wp-content/uploads/a.png";
  assert_eq!(pass.filter_url(UrlHook::StyleLoaderSrc, url), url);
  assert_eq!(pass.filter_content(IMAGE), IMAGE);
}

#[test]
fn invalid_pattern_fails_fast_or_fails_open() {
  let settings = CdnSettings {
    excludes: "(unclosed".into(),
    ..configured()
  };
  let cdn = cdn(settings);
  let host = FakeHost::default();

  assert!(matches!(
    cdn.try_begin_pass(&host),
    Err(ConfigError::InvalidExcludePattern { .. })
  ));

  let pass = cdn.begin_pass(&host).unwrap();
  let url = "https://example.com/wp-includes/js/jquery.js";
  assert_eq!(pass.filter_url(UrlHook::ScriptLoaderSrc, url), url);
  assert_eq!(pass.filter_content(IMAGE), IMAGE);
}
