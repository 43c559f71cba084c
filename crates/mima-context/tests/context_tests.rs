//! End-to-end context assembly through the public API.

use mima_context::{
    ChecksumMismatch, ChecksumOutcome, ChecksumPolicy, ContextOverrides, EngineHandle, Error,
    RemoteRepository, SnapshotUpdatePolicy, Stage,
};
use mima_test_utils::{FakeDecrypter, RecordingEngine, TestHome};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use secrecy::ExposeSecret;
use std::path::Path;
use std::sync::Arc;

fn borrowed() -> EngineHandle {
    EngineHandle::Borrowed(Arc::new(RecordingEngine::new()))
}

fn with_settings() -> mima_context::ContextOverridesBuilder {
    ContextOverrides::builder().with_user_settings(true)
}

#[test]
fn end_to_end_with_plain_overrides() {
    let home = TestHome::new();
    let overrides = ContextOverrides::builder()
        .offline(false)
        .local_repository("/tmp/repo")
        .build();

    let context = home.assembler().assemble(&overrides, borrowed()).unwrap();

    assert_eq!(context.remote_repositories(), &[RemoteRepository::central()]);
    assert_eq!(
        context.remote_repositories()[0].url,
        "https://repo.maven.apache.org/maven2/"
    );
    assert_eq!(context.local_repository(), Path::new("/tmp/repo"));
    assert!(!context.session().offline());
}

#[test]
fn explicit_offline_flag_wins_over_settings() {
    let home = TestHome::new();
    home.write_settings("offline = true\n");

    let online = with_settings().offline(false).build();
    let ctx = home.assembler().assemble(&online, borrowed()).unwrap();
    assert!(!ctx.session().offline());

    let unset = with_settings().build();
    let ctx = home.assembler().assemble(&unset, borrowed()).unwrap();
    assert!(ctx.session().offline());
}

#[test]
fn explicit_yaml_settings_file_is_read() {
    let home = TestHome::new();
    home.write_settings("localRepository = \"/srv/ignored\"\n");
    let explicit = home.write_file("team/settings.yaml", "localRepository: /srv/team\n");

    let overrides = with_settings().settings_file(&explicit).build();
    let ctx = home.assembler().assemble(&overrides, borrowed()).unwrap();
    assert_eq!(ctx.local_repository(), Path::new("/srv/team"));
}

#[test]
fn local_repository_precedence() {
    let home = TestHome::new();
    let assembler = home.assembler();

    // default only
    let ctx = assembler.assemble(&with_settings().build(), borrowed()).unwrap();
    assert_eq!(ctx.local_repository(), home.root().join(".mima/repository"));

    // settings beats default
    home.write_settings("localRepository = \"/srv/from-settings\"\n");
    let ctx = assembler.assemble(&with_settings().build(), borrowed()).unwrap();
    assert_eq!(ctx.local_repository(), Path::new("/srv/from-settings"));

    // override beats settings
    let overrides = with_settings().local_repository("/srv/from-override").build();
    let ctx = assembler.assemble(&overrides, borrowed()).unwrap();
    assert_eq!(ctx.local_repository(), Path::new("/srv/from-override"));
}

#[test]
fn user_property_overrides_ambient_value() {
    let home = TestHome::new();
    home.write_settings(
        r#"
[[profiles]]
id = "defaults"
activation = { activeByDefault = true }
properties = { "os.name" = "from-profile", "release" = "profile" }
"#,
    );
    let overrides = with_settings()
        .user_property("os.name", "from-user")
        .build();

    let ctx = home.assembler().assemble(&overrides, borrowed()).unwrap();
    let props = ctx.session().properties();

    assert_eq!(props.merged["os.name"], "from-user");
    assert_eq!(props.config_str("os.name"), Some("from-user"));
    assert_eq!(props.config_str("release"), Some("profile"));
    assert_eq!(props.system["os.name"], "linux");
    assert_eq!(props.user["os.name"], "from-user");
}

#[test]
fn profiles_listed_by_id_without_activation_do_not_contribute() {
    let home = TestHome::new();
    home.write_settings(
        r#"
activeProfiles = ["ci"]

[[profiles]]
id = "ci"
properties = { "ci.only" = "yes" }
"#,
    );

    let prepared = home.assembler().prepare(&with_settings().build()).unwrap();
    let props = prepared.session.properties();

    assert!(!props.merged.contains_key("ci.only"));
    assert!(props.config_str("ci.only").is_none());
}

#[test]
fn first_matching_mirror_wins() {
    let home = TestHome::new();
    home.write_settings(
        r#"
[[mirrors]]
id = "first"
url = "https://first.example.com/maven2"
mirrorOf = "central"

[[mirrors]]
id = "second"
url = "https://second.example.com/maven2"
mirrorOf = "*"
"#,
    );

    let ctx = home
        .assembler()
        .assemble(&with_settings().build(), borrowed())
        .unwrap();
    let route = ctx.session().selectors().route(&RemoteRepository::central());

    assert_eq!(route.target.url, "https://first.example.com/maven2");
}

#[test]
fn one_bad_secret_aborts_the_build() {
    let home = TestHome::new();
    home.write_settings(
        r#"
[[servers]]
id = "good"
password = "{good-cipher}"

[[servers]]
id = "bad"
password = "{unknown-cipher}"
"#,
    );
    let decrypter = FakeDecrypter::new().with("{good-cipher}", "good-plaintext");

    let err = home
        .assembler_with(Arc::new(decrypter))
        .assemble(&with_settings().build(), borrowed())
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Settings));
    let message = err.to_string();
    assert!(message.contains("servers[bad].password"));
    assert!(!message.contains("good-plaintext"));
}

#[test]
fn decrypted_secrets_reach_the_auth_selector() {
    let home = TestHome::new();
    home.write_settings(
        r#"
[[servers]]
id = "central"
username = "reader"
password = "{cipher}"
"#,
    );
    let decrypter = FakeDecrypter::new().with("{cipher}", "plain");

    let ctx = home
        .assembler_with(Arc::new(decrypter))
        .assemble(&with_settings().build(), borrowed())
        .unwrap();
    let auth = ctx
        .session()
        .selectors()
        .auth
        .select(&RemoteRepository::central())
        .unwrap();

    assert_eq!(auth.password.as_ref().unwrap().expose_secret(), "plain");
    assert!(!format!("{:?}", ctx).contains("\"plain\""));
}

#[test]
fn credentials_do_not_leak_across_servers() {
    let home = TestHome::new();
    home.write_settings(
        r#"
[[servers]]
id = "a"
username = "alice"

[[servers]]
id = "b"
username = "bob"
"#,
    );
    let ctx = home
        .assembler()
        .assemble(&with_settings().build(), borrowed())
        .unwrap();
    let auth = &ctx.session().selectors().auth;

    assert_eq!(auth.get("a").unwrap().username.as_deref(), Some("alice"));
    assert_eq!(auth.get("b").unwrap().username.as_deref(), Some("bob"));
    assert!(auth.get("c").is_none());
}

#[test]
fn repeated_assembly_is_idempotent() {
    let home = TestHome::new();
    home.write_settings(
        r#"
[[mirrors]]
id = "m"
url = "https://m.example.com"
mirrorOf = "*"

[[servers]]
id = "m"
configuration = { connectTimeout = 500 }
"#,
    );
    let assembler = home.assembler();
    let overrides = with_settings().user_property("k", "v").build();

    let a = assembler.assemble(&overrides, borrowed()).unwrap();
    let b = assembler.assemble(&overrides, borrowed()).unwrap();

    assert_ne!(a.id(), b.id());
    assert_eq!(a.session().properties(), b.session().properties());
    let central = RemoteRepository::central();
    assert_eq!(
        a.session().selectors().route(&central).target,
        b.session().selectors().route(&central).target
    );
}

#[test]
fn checksum_policies_against_a_mismatch() {
    let home = TestHome::new();
    let mismatch = ChecksumMismatch {
        resource: "org/example/app/1.0/app-1.0.jar".into(),
        expected: "aaaa".into(),
        actual: "bbbb".into(),
    };
    let session_for = |policy: Option<ChecksumPolicy>| {
        let mut builder = ContextOverrides::builder();
        if let Some(policy) = policy {
            builder = builder.checksum_policy(policy);
        }
        home.assembler().prepare(&builder.build()).unwrap().session
    };

    let err = session_for(Some(ChecksumPolicy::Fail))
        .on_checksum_mismatch(&mismatch)
        .unwrap_err();
    assert!(matches!(err, Error::ChecksumMismatch { .. }));

    assert_eq!(
        session_for(Some(ChecksumPolicy::Warn)).on_checksum_mismatch(&mismatch).unwrap(),
        ChecksumOutcome::Warned
    );
    assert_eq!(
        session_for(Some(ChecksumPolicy::Ignore)).on_checksum_mismatch(&mismatch).unwrap(),
        ChecksumOutcome::Ignored
    );
    // unset falls back to the engine default
    assert_eq!(
        session_for(None).on_checksum_mismatch(&mismatch).unwrap(),
        ChecksumOutcome::Warned
    );
}

#[test]
fn policies_and_resolution_error_caching_are_bound() {
    let home = TestHome::new();
    let overrides = ContextOverrides::builder()
        .snapshot_update_policy(SnapshotUpdatePolicy::Always)
        .offline(true)
        .build();

    let session = home.assembler().prepare(&overrides).unwrap().session;

    assert_eq!(session.snapshot_update_policy(), Some(SnapshotUpdatePolicy::Always));
    assert!(session.offline());
    assert!(!session.resolution_error_policy().cache_not_found);
    assert!(!session.resolution_error_policy().cache_transfer_errors);
}

#[test]
fn managed_engine_released_exactly_once() {
    let home = TestHome::new();
    let engine = Arc::new(RecordingEngine::new());

    let ctx = home
        .assembler()
        .assemble(&ContextOverrides::default(), EngineHandle::Managed(engine.clone()))
        .unwrap();
    ctx.close();
    assert_eq!(engine.shutdowns(), 1);

    {
        let _ctx = home
            .assembler()
            .assemble(&ContextOverrides::default(), EngineHandle::Managed(engine.clone()))
            .unwrap();
    }
    assert_eq!(engine.shutdowns(), 2);
}

#[test]
fn borrowed_engine_survives_its_contexts() {
    let home = TestHome::new();
    let engine = Arc::new(RecordingEngine::new());

    for _ in 0..3 {
        home.assembler()
            .assemble(&ContextOverrides::default(), EngineHandle::Borrowed(engine.clone()))
            .unwrap()
            .close();
    }
    assert_eq!(engine.shutdowns(), 0);
}

#[test]
fn transport_settings_become_per_server_config() {
    let home = TestHome::new();
    home.write_settings(
        r#"
[[servers]]
id = "corp"
filePermissions = "664"

[servers.configuration]
wagonProvider = "httpclient"
connectTimeout = 3000
httpHeaders = [{ name = "X-Corp", value = "1" }]
"#,
    );

    let ctx = home
        .assembler()
        .assemble(&with_settings().build(), borrowed())
        .unwrap();
    let config = &ctx.session().properties().config;

    assert_eq!(config["aether.connector.connectTimeout.corp"], serde_json::json!(3000));
    assert_eq!(
        config["aether.connector.http.headers.corp"],
        serde_json::json!({ "X-Corp": "1" })
    );
    assert_eq!(config["aether.connector.perms.fileMode.corp"], serde_json::json!("664"));
    assert!(!config.contains_key("aether.connector.perms.dirMode.corp"));
    assert!(!config.keys().any(|k| k.contains("wagonProvider")));
}

fn repository_strategy() -> impl Strategy<Value = RemoteRepository> {
    ("[a-z][a-z0-9-]{0,12}", "[a-z]{1,10}").prop_map(|(id, host)| {
        RemoteRepository::with_default_layout(id, format!("https://{}.example.com/maven2", host))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn explicit_repositories_are_kept_verbatim(repos in prop::collection::vec(repository_strategy(), 0..8)) {
        let home = TestHome::new();
        let overrides = ContextOverrides::builder().repositories(&repos).build();

        let prepared = home.assembler().prepare(&overrides).unwrap();
        prop_assert_eq!(prepared.remote_repositories, repos);
    }

    #[test]
    fn user_properties_always_win(key in "[a-z]{1,8}", ambient in "[a-z]{0,8}", wanted in "[a-z]{0,8}") {
        let home = TestHome::new();
        home.write_settings(&format!(
            "[[profiles]]\nid = \"p\"\nactivation = {{ activeByDefault = true }}\nproperties = {{ \"{}\" = \"{}\" }}\n",
            key, ambient
        ));
        let overrides = with_settings().user_property(key.clone(), wanted.clone()).build();

        let prepared = home.assembler().prepare(&overrides).unwrap();
        let props = prepared.session.properties();
        prop_assert_eq!(props.merged.get(&key), Some(&wanted));
        prop_assert_eq!(props.config_str(&key), Some(wanted.as_str()));
    }
}
