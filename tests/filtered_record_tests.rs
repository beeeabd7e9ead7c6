//! Filtered record tests
//!
//! A filtered record must keep the identifier of the record it was taken from
//! and must fail verification as soon as any fragment is tampered with.

use chrono::{TimeZone, Utc};
use merkle_disclosure::filtered::{
    Command, ComponentGroup, DisclosureMode, FilteredData, FilteredRecord, LedgerRecord,
    OutputState, PrivacySalt, RecordComponents, RecordMetadata, SignatoryKey, StateRef,
    TimeWindow,
};
use merkle_disclosure::{DigestAlgorithm, DisclosureError, Hash};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeMap;

fn output(i: u8) -> OutputState {
    OutputState {
        contract: if i == 3 { "cash" } else { "bond" }.to_string(),
        participants: vec![SignatoryKey(vec![i; 33])],
        data: vec![i; 4],
    }
}

fn components() -> RecordComponents {
    RecordComponents {
        notary_name: "O=Notary, L=London, C=GB".to_string(),
        time_window: TimeWindow::between(
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2030, 1, 2, 0, 0, 0).unwrap(),
        )
        .unwrap(),
        signatories: (1..=2).map(|i| SignatoryKey(vec![i; 33])).collect(),
        commands: vec![
            Command {
                name: "Issue".to_string(),
                data: vec![1],
            },
            Command {
                name: "Move".to_string(),
                data: vec![2],
            },
        ],
        inputs: (0..3)
            .map(|i| StateRef {
                transaction_id: merkle_disclosure::core::hash::sha256(&[i]),
                index: i as u32,
            })
            .collect(),
        references: Vec::new(),
        outputs: (0..5).map(output).collect(),
    }
}

fn record() -> LedgerRecord {
    LedgerRecord::new(
        RecordMetadata::new("utxo", 4),
        PrivacySalt::new([0x5a; 32]),
        &components(),
    )
    .unwrap()
}

fn assert_inconsistent(filtered: &FilteredRecord) {
    assert!(matches!(
        filtered.verify(),
        Err(DisclosureError::InconsistentFilteredData { .. })
    ));
}

#[test]
fn test_one_matching_output_of_five() {
    let record = record();
    let filtered = record
        .filter()
        .with_outputs_matching(|output| output.contract == "cash")
        .build()
        .unwrap();

    filtered.verify().unwrap();
    assert_eq!(filtered.id(), record.id());

    match filtered.outputs().unwrap() {
        FilteredData::Audit { size, values } => {
            assert_eq!(size, 5);
            assert_eq!(values, BTreeMap::from([(3, output(3))]));
        },
        other => panic!("expected an audit of outputs, got {:?}", other),
    }
    for group in [
        ComponentGroup::Signatories,
        ComponentGroup::Commands,
        ComponentGroup::Inputs,
        ComponentGroup::References,
    ] {
        assert!(record.filter().build().unwrap().group(group).is_none());
        assert!(filtered.group(group).is_none());
    }
}

#[test]
fn test_id_is_independent_of_disclosure_choices() {
    let record = record();
    let choices = [
        record.filter().build().unwrap(),
        record.filter().with_notary().with_time_window().build().unwrap(),
        record.filter().with_signatories().with_commands_size().build().unwrap(),
        record
            .filter()
            .with_inputs_matching(|input| input.index == 1)
            .with_references()
            .with_outputs_size()
            .build()
            .unwrap(),
    ];
    for filtered in &choices {
        filtered.verify().unwrap();
        assert_eq!(filtered.id(), record.id());
    }
}

#[test]
fn test_every_mode_reports_sizes() {
    let record = record();
    let filtered = record
        .filter()
        .with_signatories()
        .with_commands_size()
        .audit_indices(ComponentGroup::Inputs, [0, 2])
        .build()
        .unwrap();
    filtered.verify().unwrap();

    let signatories: BTreeMap<u32, SignatoryKey> = record
        .signatories()
        .unwrap()
        .into_iter()
        .enumerate()
        .map(|(i, key)| (i as u32, key))
        .collect();
    assert_eq!(
        filtered.signatories().unwrap(),
        FilteredData::Audit {
            size: 2,
            values: signatories,
        }
    );
    assert_eq!(filtered.commands().unwrap(), FilteredData::SizeOnly { size: 2 });
    let inputs = filtered.inputs().unwrap();
    assert_eq!(inputs.size(), Some(3));
    assert_eq!(
        inputs.values().map(|values| values.keys().copied().collect::<Vec<_>>()),
        Some(vec![0, 2])
    );
    assert!(filtered.outputs().unwrap().is_removed());
}

#[test]
fn test_notary_group_is_present_or_absent() {
    let record = record();

    let hidden = record.filter().build().unwrap();
    assert_eq!(hidden.notary_name().unwrap(), None);
    assert_eq!(hidden.time_window().unwrap(), None);

    let shown = record.filter().with_notary().with_time_window().build().unwrap();
    shown.verify().unwrap();
    assert_eq!(shown.notary_name().unwrap(), Some(components().notary_name));
    assert_eq!(shown.time_window().unwrap(), Some(components().time_window));
}

#[test]
fn test_metadata_is_always_disclosed() {
    let record = record();
    let filtered = record.filter().size_only(ComponentGroup::Metadata).build().unwrap();
    let metadata = filtered.group(ComponentGroup::Metadata).unwrap();
    assert_eq!(metadata.mode, DisclosureMode::Audit);
    assert_eq!(filtered.metadata(), record.metadata());
}

#[test]
fn test_out_of_range_index_is_rejected() {
    let record = record();
    let result = record.filter().audit_indices(ComponentGroup::Outputs, [5]).build();
    assert!(matches!(result, Err(DisclosureError::InvalidArgument { .. })));

    let empty = record.filter().audit_indices(ComponentGroup::References, [0]).build();
    assert!(matches!(empty, Err(DisclosureError::InvalidArgument { .. })));
}

#[test]
fn test_forged_id_is_inconsistent() {
    let record = record();
    let filtered = record.filter().with_outputs().build().unwrap();

    let mut json = serde_json::to_value(&filtered).unwrap();
    json["id"] = serde_json::to_value(merkle_disclosure::core::hash::sha256(b"forged")).unwrap();
    let forged: FilteredRecord = serde_json::from_value(json).unwrap();
    assert_inconsistent(&forged);
}

#[rstest]
#[case("outputs", 2)]
#[case("signatories", 0)]
#[case("notary", 1)]
fn test_tampered_element_is_inconsistent(#[case] group: &str, #[case] index: usize) {
    let record = record();
    let filtered = record
        .filter()
        .with_notary()
        .with_time_window()
        .with_signatories()
        .with_outputs()
        .build()
        .unwrap();
    filtered.verify().unwrap();

    let mut json = serde_json::to_value(&filtered).unwrap();
    let leaf = &mut json["groups"][group]["proof"]["leaves"][index]["leaf_data"];
    let mut bytes = hex::decode(leaf.as_str().unwrap()).unwrap();
    bytes[0] ^= 0xff;
    *leaf = serde_json::Value::String(hex::encode(bytes));

    let tampered: FilteredRecord = serde_json::from_value(json).unwrap();
    assert_inconsistent(&tampered);
}

#[test]
fn test_hidden_group_cannot_be_injected() {
    let record = record();
    let filtered = record.filter().with_commands().build().unwrap();
    let other = record.filter().with_outputs().build().unwrap();

    // Graft another group's fragment without its top-level disclosure
    let mut json = serde_json::to_value(&filtered).unwrap();
    json["groups"]["outputs"] = serde_json::to_value(other.group(ComponentGroup::Outputs).unwrap()).unwrap();
    let grafted: FilteredRecord = serde_json::from_value(json).unwrap();
    assert_inconsistent(&grafted);
}

#[test]
fn test_size_only_cannot_be_relabelled() {
    let record = record();
    let filtered = record.filter().with_outputs_size().build().unwrap();

    let mut json = serde_json::to_value(&filtered).unwrap();
    json["groups"]["outputs"]["proof"]["tree_size"] = serde_json::json!(4);
    let shrunk: FilteredRecord = serde_json::from_value(json).unwrap();
    assert_inconsistent(&shrunk);
}

#[test]
fn test_audit_size_cannot_be_inflated() {
    let record = record();
    let filtered = record
        .filter()
        .audit_indices(ComponentGroup::Outputs, [0])
        .build()
        .unwrap();
    filtered.verify().unwrap();
    assert_eq!(filtered.outputs().unwrap().size(), Some(5));

    // Leaf 0 of five shares its sibling path with leaf 0 of six
    let mut json = serde_json::to_value(&filtered).unwrap();
    json["groups"]["outputs"]["proof"]["tree_size"] = serde_json::json!(6);
    let inflated: FilteredRecord = serde_json::from_value(json).unwrap();
    assert_eq!(inflated.outputs().unwrap().size(), Some(6));
    assert_inconsistent(&inflated);
}

#[test]
fn test_record_under_sha384() {
    let record = LedgerRecord::new(
        RecordMetadata::new("utxo", 4).with_digest_algorithm(DigestAlgorithm::Sha384),
        PrivacySalt::random(),
        &components(),
    )
    .unwrap();
    let filtered = record.filter().with_inputs().with_outputs_size().build().unwrap();
    filtered.verify().unwrap();
    assert_eq!(filtered.id().algorithm(), DigestAlgorithm::Sha384);
    let id: Hash = filtered.id().to_string().parse().unwrap();
    assert_eq!(&id, record.id());
}

#[test]
fn test_json_round_trip_still_verifies() -> anyhow::Result<()> {
    let record = record();
    let filtered = record
        .filter()
        .with_time_window()
        .with_commands_matching(|command| command.name == "Move")
        .build()?;

    let text = serde_json::to_string_pretty(&filtered)?;
    let parsed: FilteredRecord = serde_json::from_str(&text)?;
    assert_eq!(parsed, filtered);
    parsed.verify()?;
    Ok(())
}
