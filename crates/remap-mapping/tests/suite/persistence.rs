use pretty_assertions::assert_eq;
use remap_entry::{Entry, LocalVariableEntry, MethodEntry};
use remap_mapping::{EntryMapping, EntryTree, TokenType};
use serde_json::json;

#[test]
fn mappings_serialize_without_empty_fields() {
    let mapping = EntryMapping::proposed("count", TokenType::JarProposed, "parameters")
        .unwrap()
        .with_javadoc(Some("How many.".to_string()));

    let value = serde_json::to_value(&mapping).unwrap();
    assert_eq!(
        value,
        json!({
            "target_name": "count",
            "javadoc": "How many.",
            "token_type": "jar_proposed",
            "source_id": "parameters",
        })
    );
    assert_eq!(
        serde_json::from_value::<EntryMapping>(value).unwrap(),
        mapping
    );
    assert_eq!(
        serde_json::to_value(EntryMapping::DEFAULT).unwrap(),
        json!({ "token_type": "obfuscated" })
    );
}

#[test]
fn inconsistent_mappings_are_rejected() {
    for value in [
        json!({ "target_name": "a", "token_type": "obfuscated" }),
        json!({ "target_name": "a" }),
        json!({ "token_type": "deobfuscated" }),
        json!({ "target_name": "a", "token_type": "deobfuscated", "source_id": "p" }),
        json!({ "target_name": "a", "token_type": "dynamic_proposed" }),
    ] {
        let error = serde_json::from_value::<EntryMapping>(value.clone());
        assert!(error.is_err(), "accepted {value}");
    }

    let trimmed: EntryMapping =
        serde_json::from_value(json!({ "target_name": " run ", "token_type": "deobfuscated" }))
            .unwrap();
    assert_eq!(trimmed, EntryMapping::named("run"));
}

#[test]
fn trees_can_be_stored_as_entry_mapping_pairs() {
    let method = MethodEntry::parse("a", "b", "(La;I)V").unwrap();
    let tree = EntryTree::from_iter([
        (Entry::Method(method.clone()), EntryMapping::named("attach")),
        (
            Entry::LocalVariable(LocalVariableEntry::new(method, 2)),
            EntryMapping::documented("The slot."),
        ),
    ]);

    let pairs: Vec<(&Entry, &EntryMapping)> = tree.values().collect();
    let json = serde_json::to_string(&pairs).unwrap();
    let restored: Vec<(Entry, EntryMapping)> = serde_json::from_str(&json).unwrap();

    assert_eq!(EntryTree::from_iter(restored), tree);
}
