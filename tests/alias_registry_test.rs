//! Integration tests for the bounded alias registry

use command_clinic::{
    Alias, AliasRegistry, AliasUpdate, ClinicError, LaunchTarget, DEFAULT_ALIASES, MAX_ALIASES,
};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

fn alias(id: &str, title: &str, command: &str) -> Alias {
    Alias {
        id: id.to_string(),
        title: title.to_string(),
        target: LaunchTarget::new("acme", "tools", command),
        suggest_hotkey: None,
    }
}

fn persisted(tmp: &TempDir) -> Vec<Alias> {
    let data = fs::read_to_string(tmp.path().join("aliases.json")).unwrap();
    serde_json::from_str(&data).unwrap()
}

#[tokio::test]
async fn list_seeds_three_defaults_in_fixed_order() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    let aliases = registry.list().await.unwrap();
    assert_eq!(aliases.len(), 3);
    assert_eq!(aliases[0].title, "File Search");
    assert_eq!(aliases[1].title, "Clipboard History");
    assert_eq!(aliases[2].title, "Window Management");

    // The seed was persisted, pretty-printed.
    let raw = fs::read_to_string(tmp.path().join("aliases.json")).unwrap();
    assert!(raw.contains('\n'));
    assert_eq!(persisted(&tmp), *DEFAULT_ALIASES);
}

#[tokio::test]
async fn list_falls_back_to_defaults_on_corrupt_document() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("aliases.json"), "{ not an array").unwrap();

    let registry = AliasRegistry::new(tmp.path());
    let aliases = registry.list().await.unwrap();
    assert_eq!(aliases, *DEFAULT_ALIASES);
}

#[tokio::test]
async fn add_then_list_contains_the_alias_once() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    registry.add(alias("deploy", "Deploy", "deploy")).await.unwrap();

    let aliases = registry.list().await.unwrap();
    assert_eq!(aliases.iter().filter(|a| a.id == "deploy").count(), 1);
    assert_eq!(aliases.len(), 4);
}

#[tokio::test]
async fn add_duplicate_id_fails_and_leaves_set_unchanged() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());
    registry.list().await.unwrap();
    let before = persisted(&tmp);

    let mut dup = alias("file-search", "Other", "something-else");
    dup.target.owner = "elsewhere".to_string();
    let err = registry.add(dup).await.unwrap_err();
    assert!(matches!(err, ClinicError::DuplicateAlias(_)));
    assert!(err.is_validation());
    assert_eq!(persisted(&tmp), before);
}

#[tokio::test]
async fn add_duplicate_target_triple_fails() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    let mut clone = alias("another-id", "Another", "search-files");
    clone.target = LaunchTarget::new("builtin", "file-search", "search-files");
    let err = registry.add(clone).await.unwrap_err();
    assert!(matches!(err, ClinicError::DuplicateAlias(_)));
}

#[tokio::test]
async fn add_at_capacity_fails() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    let full: Vec<Alias> = (0..MAX_ALIASES)
        .map(|i| alias(&format!("id-{i}"), &format!("Alias {i}"), &format!("cmd-{i}")))
        .collect();
    registry.save(&full).await.unwrap();

    let err = registry
        .add(alias("one-more", "One More", "one-more"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClinicError::CapacityExceeded(n) if n == MAX_ALIASES));
    assert_eq!(persisted(&tmp).len(), MAX_ALIASES);
}

#[tokio::test]
async fn add_with_empty_id_synthesizes_one() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    registry.add(alias("", "Deploy", "deploy")).await.unwrap();

    let aliases = registry.list().await.unwrap();
    let added = aliases.iter().find(|a| a.title == "Deploy").unwrap();
    assert!(added.id.starts_with("tools_deploy_"));
}

#[tokio::test]
async fn update_merges_partial_and_preserves_the_rest() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    registry
        .update(
            "file-search",
            AliasUpdate {
                title: Some("Find Anything".to_string()),
                suggest_hotkey: Some("Alt+Cmd+F".to_string()),
                ..AliasUpdate::default()
            },
        )
        .await
        .unwrap();

    let updated = registry.find("file-search").await.unwrap().unwrap();
    assert_eq!(updated.title, "Find Anything");
    assert_eq!(updated.suggest_hotkey.as_deref(), Some("Alt+Cmd+F"));
    // Untouched fields survive the merge.
    assert_eq!(updated.target, DEFAULT_ALIASES[0].target);
}

#[tokio::test]
async fn update_cannot_change_id() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());
    registry.list().await.unwrap();
    let before = persisted(&tmp);

    let err = registry
        .update(
            "file-search",
            AliasUpdate {
                id: Some("renamed".to_string()),
                title: Some("Should Not Apply".to_string()),
                ..AliasUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClinicError::ImmutableField("id")));
    assert_eq!(persisted(&tmp), before);
}

#[tokio::test]
async fn update_with_same_id_in_partial_is_allowed() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    registry
        .update(
            "file-search",
            AliasUpdate {
                id: Some("file-search".to_string()),
                title: Some("Still File Search".to_string()),
                ..AliasUpdate::default()
            },
        )
        .await
        .unwrap();

    let updated = registry.find("file-search").await.unwrap().unwrap();
    assert_eq!(updated.title, "Still File Search");
}

#[tokio::test]
async fn update_unknown_id_fails() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    let err = registry
        .update("ghost", AliasUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClinicError::AliasNotFound(id) if id == "ghost"));
}

#[tokio::test]
async fn remove_deletes_and_persists_remainder() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    registry.remove("clipboard-history").await.unwrap();

    let aliases = registry.list().await.unwrap();
    assert_eq!(aliases.len(), 2);
    assert!(aliases.iter().all(|a| a.id != "clipboard-history"));
}

#[tokio::test]
async fn remove_unknown_id_fails() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    let err = registry.remove("ghost").await.unwrap_err();
    assert!(matches!(err, ClinicError::AliasNotFound(_)));
}

#[tokio::test]
async fn persisting_an_empty_set_is_valid() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    registry.save(&[]).await.unwrap();
    let aliases = registry.list().await.unwrap();
    assert!(aliases.is_empty());
}

#[tokio::test]
async fn find_returns_none_for_unknown_id() {
    let tmp = TempDir::new().unwrap();
    let registry = AliasRegistry::new(tmp.path());

    assert!(registry.find("ghost").await.unwrap().is_none());
    assert!(registry.find("file-search").await.unwrap().is_some());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// For any valid set of distinct aliases below capacity, adding each
    /// then listing yields every alias exactly once.
    #[test]
    fn prop_add_then_list_contains_each_once(
        keys in prop::collection::btree_set(0u16..500, 1..=(MAX_ALIASES - DEFAULT_ALIASES.len()))
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let tmp = TempDir::new().unwrap();
            let registry = AliasRegistry::new(tmp.path());

            for key in &keys {
                registry
                    .add(alias(
                        &format!("id-{key}"),
                        &format!("Alias {key}"),
                        &format!("cmd-{key}"),
                    ))
                    .await
                    .unwrap();
            }

            let listed = registry.list().await.unwrap();
            let ids: BTreeSet<String> = listed.iter().map(|a| a.id.clone()).collect();
            prop_assert_eq!(listed.len(), ids.len());
            for key in &keys {
                let expected_id = format!("id-{key}");
                prop_assert!(ids.contains(&expected_id));
            }
            Ok(())
        })?;
    }
}
