//! Symbol-scan resolution against an in-memory run archive.

use simverify_core::identifier::{resolve_channel_name, resolve_channel_names, Identifier};
use simverify_core::{InMemoryHistoryStore, VerifyErrorCategory};

fn steps() -> Vec<String> {
    vec!["Step-1".to_string()]
}

fn identifier(json: &str) -> Identifier {
    serde_json::from_str(json).expect("identifier should parse")
}

fn single_node_store() -> InMemoryHistoryStore {
    InMemoryHistoryStore::from_json(
        r#"
        {
          "steps": [
            {
              "name": "Step-1",
              "regions": [
                {
                  "label": "Node PART-1-1.9",
                  "outputs": [
                    {
                      "symbol": "RF1",
                      "name": "Reaction force: RF1 at Node 9 in NSET LOADAPP",
                      "data": [[0.0, 0.0], [1.0, 1.0]]
                    }
                  ]
                },
                {
                  "label": "Element 4 Int Point 1",
                  "outputs": [
                    {
                      "symbol": "SDV_ALPHA",
                      "name": "Solution dependent state variables: SDV_ALPHA at Element 4 Int Point 1 in ELSET DAMAGE",
                      "data": [[0.0, 0.0], [1.0, 0.5]]
                    }
                  ]
                }
              ]
            }
          ]
        }
        "#,
    )
    .expect("archive should parse")
}

#[test]
fn position_omitted_scan_resolves_the_single_matching_node() {
    let store = single_node_store();
    let name = resolve_channel_name(
        &identifier(r#"{ "symbol": "RF1", "nset": "LOADAPP" }"#),
        &steps(),
        &store,
    )
    .expect("scan should resolve");
    assert_eq!(name, "Reaction force: RF1 at Node 9 in NSET LOADAPP");
}

#[test]
fn two_matching_node_regions_are_unresolved() {
    let store = InMemoryHistoryStore::from_json(
        r#"
        {
          "steps": [
            {
              "name": "Step-1",
              "regions": [
                {
                  "label": "Node PART-1-1.9",
                  "outputs": [{ "symbol": "RF1", "name": "a", "data": [] }]
                },
                {
                  "label": "Node PART-1-1.12",
                  "outputs": [{ "symbol": "RF1", "name": "b", "data": [] }]
                }
              ]
            }
          ]
        }
        "#,
    )
    .expect("archive should parse");

    let error = resolve_channel_name(
        &identifier(r#"{ "symbol": "RF1", "nset": "LOADAPP" }"#),
        &steps(),
        &store,
    )
    .expect_err("two matches should fail");
    assert_eq!(error.category(), VerifyErrorCategory::UnresolvedIdentifier);
}

#[test]
fn zero_matching_regions_are_unresolved() {
    let store = single_node_store();
    let error = resolve_channel_name(
        &identifier(r#"{ "symbol": "U3", "nset": "LOADAPP" }"#),
        &steps(),
        &store,
    )
    .expect_err("no matches should fail");
    assert_eq!(error.category(), VerifyErrorCategory::UnresolvedIdentifier);
}

#[test]
fn element_symbols_fall_back_to_case_insensitive_matches() {
    let store = single_node_store();
    let name = resolve_channel_name(
        &identifier(
            r#"{ "symbol": "sdv_alpha", "position": "Element 4 Int Point 1", "elset": "DAMAGE" }"#,
        ),
        &steps(),
        &store,
    )
    .expect("case-insensitive fallback should resolve");
    assert_eq!(
        name,
        "Solution dependent state variables: SDV_ALPHA at Element 4 Int Point 1 in ELSET DAMAGE"
    );
}

#[test]
fn identifier_sequences_resolve_to_ordered_name_lists() {
    let store = single_node_store();
    let identifiers = vec![
        identifier(r#"{ "symbol": "RF1", "nset": "LOADAPP" }"#),
        Identifier::Literal("anything verbatim".to_string()),
    ];
    let names =
        resolve_channel_names(&identifiers, &steps(), &store).expect("sequence should resolve");
    assert_eq!(
        names,
        vec![
            "Reaction force: RF1 at Node 9 in NSET LOADAPP".to_string(),
            "anything verbatim".to_string(),
        ]
    );
}

#[test]
fn total_strain_and_unknown_symbols_are_unsupported() {
    let store = single_node_store();
    for symbol in ["E11", "NT11"] {
        let error = resolve_channel_name(
            &identifier(&format!(
                r#"{{ "symbol": "{symbol}", "position": "Element 1 Int Point 1", "elset": "ALL" }}"#
            )),
            &steps(),
            &store,
        )
        .expect_err("unsupported symbol should fail");
        assert_eq!(
            error.category(),
            VerifyErrorCategory::UnsupportedIdentifier,
            "symbol {symbol}"
        );
    }
}
